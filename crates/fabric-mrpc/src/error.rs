//! Error types for MRPC transport operations.

use std::io;
use thiserror::Error;

use crate::status::{MrpcCmd, MrpcStatus};

/// Result type alias for MRPC operations.
pub type MrpcResult<T> = Result<T, MrpcError>;

/// Errors that can occur while exchanging an MRPC command with a device.
#[derive(Debug, Error)]
pub enum MrpcError {
    /// The device executed the command and returned a non-zero status.
    #[error("{cmd} rejected by device: {status}")]
    Status {
        /// The command that was rejected.
        cmd: MrpcCmd,
        /// Status reported by the firmware.
        status: MrpcStatus,
    },

    /// The device node could not be opened.
    #[error("Failed to open device '{path}': {source}")]
    Open {
        /// Resolved device path.
        path: String,
        #[source]
        source: io::Error,
    },

    /// Reading or writing the device failed.
    #[error("I/O error during {cmd}: {source}")]
    Io {
        cmd: MrpcCmd,
        #[source]
        source: io::Error,
    },

    /// The device did not answer in time.
    #[error("{cmd} timed out after {timeout_ms}ms")]
    Timeout { cmd: MrpcCmd, timeout_ms: u64 },

    /// The reply was shorter than the command's output layout.
    #[error("{cmd} reply too short: expected {expected} bytes, got {actual}")]
    ShortReply {
        cmd: MrpcCmd,
        expected: usize,
        actual: usize,
    },

    /// The encoded request does not fit in an MRPC input buffer.
    #[error("{cmd} payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { cmd: MrpcCmd, len: usize, max: usize },
}

impl MrpcError {
    /// Creates a device status error.
    pub fn status(cmd: MrpcCmd, status: impl Into<MrpcStatus>) -> Self {
        Self::Status {
            cmd,
            status: status.into(),
        }
    }

    /// Creates a short reply error.
    pub fn short_reply(cmd: MrpcCmd, expected: usize, actual: usize) -> Self {
        Self::ShortReply {
            cmd,
            expected,
            actual,
        }
    }

    /// Returns the firmware status if the device rejected the command.
    pub fn device_status(&self) -> Option<MrpcStatus> {
        match self {
            MrpcError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
