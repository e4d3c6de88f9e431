//! Execution of `fabric` subcommands.
//!
//! A parsed command goes through three stages, each of which can end the
//! run with its own exit code:
//!
//! 1. [`FabricCommand::into_request`] validates the arguments (exit 1)
//! 2. the device is opened (exit 3)
//! 3. [`execute`] runs exactly one device command (exit 2 or 3)

use std::io::Write;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, instrument};

use fabric_mrpc::{Device, MrpcResult};
use fabric_types::{
    BindRequest, LinkControlCommand, PhysPortId, PortConfig, PortConfigInfo, UnbindRequest,
};

use crate::cli::{render_usage, Cli, FabricCommand};
use crate::error::{FabricError, FabricResult};
use crate::{ops, BindingManager, PortConfigStore, PortController};

/// A validated fabric operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FabricRequest {
    Bind(BindRequest),
    Unbind(UnbindRequest),
    PortControl(LinkControlCommand),
    PortConfigSet {
        phys_port_id: PhysPortId,
        config: PortConfig,
    },
    PortConfigShow {
        phys_port_id: PhysPortId,
        json: bool,
    },
}

impl FabricRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            FabricRequest::Bind(_) => ops::GFMS_BIND,
            FabricRequest::Unbind(_) => ops::GFMS_UNBIND,
            FabricRequest::PortControl(_) => ops::PORT_CONTROL,
            FabricRequest::PortConfigSet { .. } => ops::PORTCFG_SET,
            FabricRequest::PortConfigShow { .. } => ops::PORTCFG_SHOW,
        }
    }
}

/// Runs one request against `device`.
///
/// Returns the text to print on success. Mutating operations print nothing.
#[instrument(skip(device), fields(device = %device.name()))]
pub async fn execute<D: Device>(request: FabricRequest, device: D) -> FabricResult<Option<String>> {
    match request {
        FabricRequest::Bind(req) => {
            BindingManager::new(device).bind(req).await?;
            Ok(None)
        }
        FabricRequest::Unbind(req) => {
            BindingManager::new(device).unbind(req).await?;
            Ok(None)
        }
        FabricRequest::PortControl(cmd) => {
            PortController::new(device).apply(cmd).await?;
            Ok(None)
        }
        FabricRequest::PortConfigSet {
            phys_port_id,
            config,
        } => {
            PortConfigStore::new(device).set(phys_port_id, config).await?;
            Ok(None)
        }
        FabricRequest::PortConfigShow { phys_port_id, json } => {
            let info = PortConfigStore::new(device).get(phys_port_id).await?;
            let text = if json {
                format!("{:#}\n", port_config_json(phys_port_id, &info))
            } else {
                info.to_string()
            };
            Ok(Some(text))
        }
    }
}

/// JSON form of a port configuration report.
///
/// Labels follow the text output. Raw values are included so that
/// out-of-range bytes stay visible.
fn port_config_json(phys_port_id: PhysPortId, info: &PortConfigInfo) -> serde_json::Value {
    json!({
        "phys_port_id": phys_port_id,
        "port_type": info.port_type_label(),
        "port_type_raw": info.port_type,
        "clock_source": info.clock_source,
        "clock_mode": info.clock_mode_label(),
        "clock_mode_raw": info.clock_mode,
        "hvd_instance": info.hvd_instance,
    })
}

/// Runs a parsed command line and returns the process exit code.
///
/// `open` is called at most once, and only after the arguments validated.
/// Results go to `out`, usage and errors to `err`.
pub async fn dispatch<D, F, W, E>(cli: Cli, open: F, out: &mut W, err: &mut E) -> u8
where
    D: Device,
    F: FnOnce(&str, Duration) -> MrpcResult<D>,
    W: Write,
    E: Write,
{
    match run(cli.command, Duration::from_millis(cli.timeout_ms), open).await {
        Ok(Some(text)) => {
            // A closed stdout is not worth a failure exit.
            let _ = out.write_all(text.as_bytes());
            let _ = out.flush();
            0
        }
        Ok(None) => 0,
        Err((operation, e)) => {
            if e.is_usage() {
                let _ = writeln!(err, "{e}\n\n{}", render_usage(operation));
            } else {
                debug!(operation, error = %e, "Fabric operation failed");
                let _ = writeln!(err, "{e}");
            }
            e.exit_code()
        }
    }
}

async fn run<D, F>(
    command: FabricCommand,
    timeout: Duration,
    open: F,
) -> Result<Option<String>, (&'static str, FabricError)>
where
    D: Device,
    F: FnOnce(&str, Duration) -> MrpcResult<D>,
{
    let operation = command.operation();
    let arg = command.device().to_string();
    let request = command.into_request().map_err(|e| (operation, e))?;

    debug!(operation, device = %arg, ?timeout, "Opening device");
    let device = open(&arg, timeout).map_err(|e| (operation, FabricError::from_mrpc(operation, e)))?;

    execute(request, device).await.map_err(|e| (operation, e))
}
