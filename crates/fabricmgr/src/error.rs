//! Error types for fabric operations.
//!
//! Every failure is classified by where it happened, which also decides the
//! process exit code:
//!
//! | Variant | Exit code |
//! |---------|-----------|
//! | [`FabricError::Usage`] | 1 |
//! | [`FabricError::DeviceRejected`] | 2 |
//! | [`FabricError::Transport`] | 3 |

use fabric_mrpc::{MrpcError, MrpcStatus};
use thiserror::Error;

/// Result type alias for fabric operations.
pub type FabricResult<T> = Result<T, FabricError>;

/// Errors that can occur during fabric operations.
#[derive(Debug, Error)]
pub enum FabricError {
    /// The request was incomplete or invalid. The device was never contacted.
    #[error("{operation}: {message}")]
    Usage {
        /// The operation being requested.
        operation: String,
        /// Error message.
        message: String,
    },

    /// The device executed the request and reported a failure.
    #[error("{operation}: {status}")]
    DeviceRejected {
        /// The operation that was rejected.
        operation: String,
        /// Firmware status, relayed verbatim.
        status: MrpcStatus,
    },

    /// The request could not be delivered or its reply was malformed.
    #[error("{operation}: {source}")]
    Transport {
        /// The operation that failed.
        operation: String,
        /// The underlying transport error.
        #[source]
        source: MrpcError,
    },
}

impl FabricError {
    /// Creates a usage error.
    pub fn usage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Usage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Classifies a transport-level error for `operation`.
    ///
    /// Device status codes become [`FabricError::DeviceRejected`], anything
    /// else is a [`FabricError::Transport`] failure.
    pub fn from_mrpc(operation: impl Into<String>, err: MrpcError) -> Self {
        match err.device_status() {
            Some(status) => Self::DeviceRejected {
                operation: operation.into(),
                status,
            },
            None => Self::Transport {
                operation: operation.into(),
                source: err,
            },
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            FabricError::Usage { .. } => 1,
            FabricError::DeviceRejected { .. } => 2,
            FabricError::Transport { .. } => 3,
        }
    }

    /// Returns true if the device was never reached.
    pub fn is_usage(&self) -> bool {
        matches!(self, FabricError::Usage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_mrpc::MrpcCmd;

    #[test]
    fn test_from_mrpc_status() {
        let err = FabricError::from_mrpc(
            "portcfg_show",
            MrpcError::status(MrpcCmd::PortConfig, MrpcStatus::PORT_INVALID),
        );
        assert!(matches!(
            err,
            FabricError::DeviceRejected {
                status: MrpcStatus::PORT_INVALID,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "portcfg_show: ERR_PORT_INVALID (0x100002)"
        );
    }

    #[test]
    fn test_from_mrpc_transport() {
        let err = FabricError::from_mrpc(
            "port_control",
            MrpcError::Timeout {
                cmd: MrpcCmd::PortControl,
                timeout_ms: 100,
            },
        );
        assert_eq!(err.exit_code(), 3);
        assert!(!err.is_usage());
        assert_eq!(
            err.to_string(),
            "port_control: MRPC_PORT_CONTROL timed out after 100ms"
        );
    }

    #[test]
    fn test_usage() {
        let err = FabricError::usage("portcfg_show", "--phys_port_id is required");
        assert_eq!(err.exit_code(), 1);
        assert!(err.is_usage());
        assert_eq!(err.to_string(), "portcfg_show: --phys_port_id is required");
    }
}
