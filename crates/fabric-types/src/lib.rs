//! Common types for PCIe switch fabric management.
//!
//! This crate provides type-safe representations of the values exchanged
//! with a fabric-capable PCIe switch:
//!
//! - [`PortType`], [`ClockMode`], [`PortConfig`]: per-port configuration
//! - [`PortConfigInfo`]: port configuration as reported by the device
//! - [`LinkControl`], [`HotResetFlag`], [`LinkControlCommand`]: link control
//! - [`HostRef`], [`BindRequest`], [`UnbindRequest`]: endpoint bindings
//!
//! Enumerations are closed. Raw bytes coming back from a device are kept
//! as-is in [`PortConfigInfo`] and only mapped to a label when displayed.

mod binding;
mod control;
mod port;

pub use binding::{BindRequest, HostRef, Pdfid, UnbindRequest};
pub use control::{HotResetFlag, LinkControl, LinkControlCommand};
pub use port::{ClockMode, PhysPortId, PortConfig, PortConfigInfo, PortType, INVALID_LABEL};

/// Error for raw values that fall outside a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid port type: {0}")]
    InvalidPortType(u8),

    #[error("invalid clock mode: {0}")]
    InvalidClockMode(u8),

    #[error("invalid port control type: {0}")]
    InvalidControlType(u8),

    #[error("invalid hot reset flag: {0}")]
    InvalidHotResetFlag(u8),

    #[error("port type {0} cannot be configured")]
    PortTypeNotSettable(PortType),
}
