//! MRPC command identifiers and firmware return codes.

use std::fmt;

/// Maximum MRPC input or output payload in bytes.
pub const MRPC_MAX_DATA_LEN: usize = 1024;

/// MRPC commands used for fabric management.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MrpcCmd {
    /// GFMS bind/unbind of endpoint functions (sub-commanded).
    GfmsBindUnbind = 0x84,
    /// Physical port link control.
    PortControl = 0x86,
    /// Physical port configuration get/set (sub-commanded).
    PortConfig = 0x88,
}

impl MrpcCmd {
    /// Returns the raw command id written to the device.
    pub const fn as_raw(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for MrpcCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MrpcCmd::GfmsBindUnbind => "MRPC_GFMS_BIND_UNBIND",
            MrpcCmd::PortControl => "MRPC_PORT_CONTROL",
            MrpcCmd::PortConfig => "MRPC_PORT_CONFIG",
        };
        f.write_str(s)
    }
}

/// Non-zero return value reported by the switch firmware.
///
/// The value is relayed as-is. Known codes get a symbolic name for display
/// but are never remapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MrpcStatus(u32);

impl MrpcStatus {
    pub const NO_AVAIL_MRPC_THREAD: Self = MrpcStatus(0x64001);
    pub const HANDLER_THREAD_NOT_IDLE: Self = MrpcStatus(0x64002);
    pub const NO_BG_THREAD: Self = MrpcStatus(0x64003);
    pub const SUBCMD_INVALID: Self = MrpcStatus(0x64004);
    pub const CMD_INVALID: Self = MrpcStatus(0x64005);
    pub const PARAM_INVALID: Self = MrpcStatus(0x64006);
    pub const BAD_FW_STATE: Self = MrpcStatus(0x64007);
    pub const MRPC_DENIED: Self = MrpcStatus(0x64008);
    pub const STACK_INVALID: Self = MrpcStatus(0x100001);
    pub const PORT_INVALID: Self = MrpcStatus(0x100002);
    pub const EVENT_INVALID: Self = MrpcStatus(0x100003);
    pub const RST_RULE_FAILED: Self = MrpcStatus(0x100005);
    pub const ACCESS_REFUSED: Self = MrpcStatus(0xFFFF_0001);

    pub const fn new(raw: u32) -> Self {
        MrpcStatus(raw)
    }

    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    /// Returns the firmware name of the code, if it is a known one.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::NO_AVAIL_MRPC_THREAD => "ERR_NO_AVAIL_MRPC_THREAD",
            Self::HANDLER_THREAD_NOT_IDLE => "ERR_HANDLER_THREAD_NOT_IDLE",
            Self::NO_BG_THREAD => "ERR_NO_BG_THREAD",
            Self::SUBCMD_INVALID => "ERR_SUBCMD_INVALID",
            Self::CMD_INVALID => "ERR_CMD_INVALID",
            Self::PARAM_INVALID => "ERR_PARAM_INVALID",
            Self::BAD_FW_STATE => "ERR_BAD_FW_STATE",
            Self::MRPC_DENIED => "ERR_MRPC_DENIED",
            Self::STACK_INVALID => "ERR_STACK_INVALID",
            Self::PORT_INVALID => "ERR_PORT_INVALID",
            Self::EVENT_INVALID => "ERR_EVENT_INVALID",
            Self::RST_RULE_FAILED => "ERR_RST_RULE_FAILED",
            Self::ACCESS_REFUSED => "ERR_ACCESS_REFUSED",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u32> for MrpcStatus {
    fn from(raw: u32) -> Self {
        MrpcStatus(raw)
    }
}

impl fmt::Display for MrpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} (0x{:x})", name, self.0),
            None => write!(f, "status 0x{:x}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_raw() {
        assert_eq!(MrpcCmd::GfmsBindUnbind.as_raw(), 0x84);
        assert_eq!(MrpcCmd::PortControl.as_raw(), 0x86);
        assert_eq!(MrpcCmd::PortConfig.as_raw(), 0x88);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(
            MrpcStatus::PORT_INVALID.to_string(),
            "ERR_PORT_INVALID (0x100002)"
        );
        assert_eq!(MrpcStatus::new(0x1234).to_string(), "status 0x1234");
    }

    #[test]
    fn test_status_is_relayed_verbatim() {
        let status = MrpcStatus::from(0xdead_beef);
        assert_eq!(status.as_raw(), 0xdead_beef);
        assert_eq!(status.name(), None);
    }
}
