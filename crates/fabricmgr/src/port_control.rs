//! PortController - link state transitions

use tracing::{info, instrument};

use fabric_mrpc::{execute, Device};
use fabric_types::LinkControlCommand;

use crate::error::{FabricError, FabricResult};
use crate::ops;

/// Requests link transitions on physical ports.
///
/// The link state machine runs in the switch. Success means the device
/// accepted the command, not that the link reached a given state.
pub struct PortController<D> {
    device: D,
}

impl<D: Device> PortController<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    #[instrument(skip(self), fields(device = %self.device.name(), %cmd))]
    pub async fn apply(&mut self, cmd: LinkControlCommand) -> FabricResult<()> {
        execute(&mut self.device, &cmd)
            .await
            .map_err(|e| FabricError::from_mrpc(ops::PORT_CONTROL, e))?;

        info!("Port control accepted");
        Ok(())
    }
}
