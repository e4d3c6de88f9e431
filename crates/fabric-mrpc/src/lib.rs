//! MRPC transport for fabric-capable PCIe switches.
//!
//! Management requests reach the switch firmware as MRPC commands: a 32-bit
//! command id followed by a small little-endian payload. The firmware answers
//! with a 32-bit return value and an optional output payload.
//!
//! - [`status`]: command ids and firmware return codes
//! - [`error`]: transport error type
//! - [`wire`]: byte layouts of the fabric requests
//! - [`device`]: the [`Device`] trait and the Linux character device backend
//! - [`sim`]: an in-memory switch implementing [`Device`]
//!
//! # Example
//!
//! ```ignore
//! use fabric_mrpc::{device, wire::PortConfigGet, CharDevice};
//!
//! let mut dev = CharDevice::open("switchtec0", Duration::from_secs(5))?;
//! let info = device::execute(&mut dev, &PortConfigGet::new(4)).await?;
//! print!("{info}");
//! ```

pub mod device;
pub mod error;
pub mod sim;
pub mod status;
pub mod wire;

pub use device::{execute, resolve_device_path, CharDevice, Device};
pub use error::{MrpcError, MrpcResult};
pub use status::{MrpcCmd, MrpcStatus, MRPC_MAX_DATA_LEN};
