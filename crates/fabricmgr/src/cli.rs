//! Command line definition for the `fabric` binary.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};

use fabric_types::{
    BindRequest, ClockMode, HostRef, HotResetFlag, LinkControl, LinkControlCommand, Pdfid,
    PhysPortId, PortConfig, PortType, UnbindRequest,
};

use crate::commands::FabricRequest;
use crate::error::{FabricError, FabricResult};
use crate::ops;

/// Default time to wait for the device to answer one command.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Management of fabric-capable PCIe switches
#[derive(Debug, Parser)]
#[command(name = "fabric")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Time to wait for the device to answer, in milliseconds
    #[arg(
        long,
        env = "FABRIC_TIMEOUT_MS",
        default_value_t = DEFAULT_TIMEOUT_MS,
        global = true
    )]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: FabricCommand,
}

#[derive(Debug, Subcommand)]
pub enum FabricCommand {
    /// Bind an endpoint function to a host logical port
    #[command(name = "gfms_bind")]
    GfmsBind(GfmsBindArgs),

    /// Unbind the endpoint function from a host logical port
    #[command(name = "gfms_unbind")]
    GfmsUnbind(GfmsUnbindArgs),

    /// Disable, enable, retrain or hot reset a port link
    #[command(name = "port_control")]
    PortControl(PortControlArgs),

    /// Set the role and clocking of a physical port
    #[command(name = "portcfg_set")]
    PortcfgSet(PortcfgSetArgs),

    /// Show the configuration of a physical port
    #[command(name = "portcfg_show")]
    PortcfgShow(PortcfgShowArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DeviceArgs {
    /// Switch device: a path, a name like switchtec0, or an index
    #[arg(value_name = "DEVICE")]
    pub device: String,
}

#[derive(Debug, Clone, Args)]
pub struct GfmsBindArgs {
    #[command(flatten)]
    pub dev: DeviceArgs,

    /// Host switch index
    #[arg(short = 's', long = "host_sw_idx")]
    pub host_sw_idx: u8,

    /// Host physical port id
    #[arg(short = 'p', long = "phys_port_id")]
    pub phys_port_id: PhysPortId,

    /// Host logical port id
    #[arg(short = 'l', long = "log_port_id")]
    pub log_port_id: u8,

    /// Endpoint function (pdfid)
    #[arg(short = 'f', long = "pdfid")]
    pub pdfid: Pdfid,
}

#[derive(Debug, Clone, Args)]
pub struct GfmsUnbindArgs {
    #[command(flatten)]
    pub dev: DeviceArgs,

    /// Host switch index
    #[arg(short = 's', long = "host_sw_idx")]
    pub host_sw_idx: u8,

    /// Host physical port id
    #[arg(short = 'p', long = "phys_port_id")]
    pub phys_port_id: PhysPortId,

    /// Host logical port id
    #[arg(short = 'l', long = "log_port_id")]
    pub log_port_id: u8,
}

#[derive(Debug, Clone, Args)]
pub struct PortControlArgs {
    #[command(flatten)]
    pub dev: DeviceArgs,

    /// Port control type
    #[arg(short = 't', long = "control_type", value_enum, ignore_case = true)]
    pub control_type: LinkControl,

    /// Physical port id
    #[arg(short = 'p', long = "phys_port_id")]
    pub phys_port_id: PhysPortId,

    /// Hot reset flag
    #[arg(short = 'f', long = "hot_reset_flag", value_enum, ignore_case = true)]
    pub hot_reset_flag: HotResetFlag,
}

#[derive(Debug, Clone, Args)]
pub struct PortcfgSetArgs {
    #[command(flatten)]
    pub dev: DeviceArgs,

    /// Physical port id
    #[arg(short = 'p', long = "phys_port_id")]
    pub phys_port_id: PhysPortId,

    /// Port type
    #[arg(short = 't', long = "port_type", value_enum, ignore_case = true)]
    pub port_type: PortType,

    /// Clock source
    #[arg(short = 'c', long = "clock_source", default_value_t = 0)]
    pub clock_source: u8,

    /// Clock mode
    #[arg(short = 'm', long = "clock_mode", value_enum, ignore_case = true)]
    pub clock_mode: ClockMode,

    /// HVD instance
    #[arg(short = 'd', long = "hvd_id", default_value_t = 0)]
    pub hvd_id: u8,
}

#[derive(Debug, Clone, Args)]
pub struct PortcfgShowArgs {
    #[command(flatten)]
    pub dev: DeviceArgs,

    /// Physical port id
    #[arg(short = 'p', long = "phys_port_id")]
    pub phys_port_id: Option<PhysPortId>,

    /// Print the configuration as JSON
    #[arg(long)]
    pub json: bool,
}

impl FabricCommand {
    /// Returns the operation name of the subcommand.
    pub fn operation(&self) -> &'static str {
        match self {
            FabricCommand::GfmsBind(_) => ops::GFMS_BIND,
            FabricCommand::GfmsUnbind(_) => ops::GFMS_UNBIND,
            FabricCommand::PortControl(_) => ops::PORT_CONTROL,
            FabricCommand::PortcfgSet(_) => ops::PORTCFG_SET,
            FabricCommand::PortcfgShow(_) => ops::PORTCFG_SHOW,
        }
    }

    /// Returns the device argument of the subcommand.
    pub fn device(&self) -> &str {
        let dev = match self {
            FabricCommand::GfmsBind(args) => &args.dev,
            FabricCommand::GfmsUnbind(args) => &args.dev,
            FabricCommand::PortControl(args) => &args.dev,
            FabricCommand::PortcfgSet(args) => &args.dev,
            FabricCommand::PortcfgShow(args) => &args.dev,
        };
        &dev.device
    }

    /// Validates the arguments into a request. Never touches a device.
    pub fn into_request(self) -> FabricResult<FabricRequest> {
        let request = match self {
            FabricCommand::GfmsBind(args) => FabricRequest::Bind(BindRequest::new(
                HostRef::new(args.host_sw_idx, args.phys_port_id, args.log_port_id),
                args.pdfid,
            )),
            FabricCommand::GfmsUnbind(args) => FabricRequest::Unbind(UnbindRequest::new(
                HostRef::new(args.host_sw_idx, args.phys_port_id, args.log_port_id),
            )),
            FabricCommand::PortControl(args) => {
                FabricRequest::PortControl(LinkControlCommand::new(
                    args.control_type,
                    args.phys_port_id,
                    args.hot_reset_flag,
                ))
            }
            FabricCommand::PortcfgSet(args) => {
                let config = PortConfig::new(
                    args.port_type,
                    args.clock_source,
                    args.clock_mode,
                    args.hvd_id,
                )
                .map_err(|e| FabricError::usage(ops::PORTCFG_SET, e.to_string()))?;
                FabricRequest::PortConfigSet {
                    phys_port_id: args.phys_port_id,
                    config,
                }
            }
            FabricCommand::PortcfgShow(args) => {
                let phys_port_id = args.phys_port_id.ok_or_else(|| {
                    FabricError::usage(ops::PORTCFG_SHOW, "--phys_port_id is required")
                })?;
                FabricRequest::PortConfigShow {
                    phys_port_id,
                    json: args.json,
                }
            }
        };
        Ok(request)
    }
}

/// Parses command line arguments.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Returns the exit code for a command line parse failure.
///
/// Help and version output are successful runs. Everything else is a usage
/// error.
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Renders the usage line of a subcommand, or of the whole program if
/// `operation` is not a known subcommand.
pub fn render_usage(operation: &str) -> String {
    let mut cmd = Cli::command();
    cmd.build();
    match cmd.find_subcommand_mut(operation) {
        Some(sub) => sub.render_usage().to_string(),
        None => cmd.render_usage().to_string(),
    }
}
