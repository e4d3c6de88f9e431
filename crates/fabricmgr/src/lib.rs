//! # fabricmgr - PCIe Switch Fabric Manager
//!
//! Control plane for a fabric-capable PCIe switch. Each operation is one
//! request/acknowledgment exchange with the switch firmware; no switch state
//! is cached on the host.
//!
//! ## Responsibilities
//! - Port roles and clock configuration ([`PortConfigStore`])
//! - Link state transitions ([`PortController`])
//! - Host to endpoint-function bindings ([`BindingManager`])
//! - The `fabric` command line ([`cli`], [`commands`])
//!
//! Any [`fabric_mrpc::Device`] can back the managers: the switch character
//! device in production, [`fabric_mrpc::sim::SimSwitch`] in tests.

mod binding;
pub mod cli;
pub mod commands;
mod error;
mod port_config;
mod port_control;

pub use binding::BindingManager;
pub use commands::{dispatch, execute, FabricRequest};
pub use error::{FabricError, FabricResult};
pub use port_config::PortConfigStore;
pub use port_control::PortController;

/// Operation names, as used on the command line and in error messages.
pub mod ops {
    pub const GFMS_BIND: &str = "gfms_bind";
    pub const GFMS_UNBIND: &str = "gfms_unbind";
    pub const PORT_CONTROL: &str = "port_control";
    pub const PORTCFG_SET: &str = "portcfg_set";
    pub const PORTCFG_SHOW: &str = "portcfg_show";
}
