//! Endpoint function to host bindings.

use crate::PhysPortId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PCIe device/function identifier of an endpoint function in the fabric.
pub type Pdfid = u16;

/// Host-facing port through which an endpoint function is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HostRef {
    /// Host switch index.
    pub host_sw_idx: u8,
    /// Host physical port id.
    pub host_phys_port_id: PhysPortId,
    /// Host logical port id.
    pub host_log_port_id: u8,
}

impl HostRef {
    pub const fn new(host_sw_idx: u8, host_phys_port_id: PhysPortId, host_log_port_id: u8) -> Self {
        Self {
            host_sw_idx,
            host_phys_port_id,
            host_log_port_id,
        }
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sw{}/phys{}/log{}",
            self.host_sw_idx, self.host_phys_port_id, self.host_log_port_id
        )
    }
}

/// Request to bind an endpoint function to a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindRequest {
    pub host: HostRef,
    pub pdfid: Pdfid,
}

impl BindRequest {
    pub const fn new(host: HostRef, pdfid: Pdfid) -> Self {
        Self { host, pdfid }
    }
}

/// Request to remove whatever function is bound at a host reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnbindRequest {
    pub host: HostRef,
}

impl UnbindRequest {
    pub const fn new(host: HostRef) -> Self {
        Self { host }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_ref_display() {
        assert_eq!(HostRef::new(0, 4, 1).to_string(), "sw0/phys4/log1");
    }

    #[test]
    fn test_host_ref_ordering() {
        let a = HostRef::new(0, 4, 1);
        let b = HostRef::new(0, 4, 2);
        let c = HostRef::new(1, 0, 0);
        assert!(a < b);
        assert!(b < c);
    }
}
