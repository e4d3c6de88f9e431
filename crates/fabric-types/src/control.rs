//! Link control requests.

use crate::{ParseError, PhysPortId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Link-level transition requested on a physical port.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LinkControl {
    /// disable port
    #[cfg_attr(feature = "clap", value(name = "DISABLE"))]
    Disable = 0,
    /// enable port
    #[cfg_attr(feature = "clap", value(name = "ENABLE"))]
    Enable = 1,
    /// link retrain
    #[cfg_attr(feature = "clap", value(name = "RETRAIN"))]
    Retrain = 2,
    /// link hot reset
    #[cfg_attr(feature = "clap", value(name = "HOT_RESET"))]
    HotReset = 3,
}

impl LinkControl {
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LinkControl {
    type Error = ParseError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(LinkControl::Disable),
            1 => Ok(LinkControl::Enable),
            2 => Ok(LinkControl::Retrain),
            3 => Ok(LinkControl::HotReset),
            _ => Err(ParseError::InvalidControlType(raw)),
        }
    }
}

impl fmt::Display for LinkControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkControl::Disable => "disable",
            LinkControl::Enable => "enable",
            LinkControl::Retrain => "retrain",
            LinkControl::HotReset => "hot-reset",
        };
        f.write_str(s)
    }
}

/// Hot reset status flag. Only meaningful with [`LinkControl::HotReset`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HotResetFlag {
    /// hot reset status clear
    #[default]
    #[cfg_attr(feature = "clap", value(name = "CLEAR"))]
    Clear = 0,
    /// hot reset status set
    #[cfg_attr(feature = "clap", value(name = "SET"))]
    Set = 1,
}

impl HotResetFlag {
    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for HotResetFlag {
    type Error = ParseError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(HotResetFlag::Clear),
            1 => Ok(HotResetFlag::Set),
            _ => Err(ParseError::InvalidHotResetFlag(raw)),
        }
    }
}

impl fmt::Display for HotResetFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotResetFlag::Clear => f.write_str("clear"),
            HotResetFlag::Set => f.write_str("set"),
        }
    }
}

/// A single port control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkControlCommand {
    pub control: LinkControl,
    pub phys_port_id: PhysPortId,
    pub hot_reset_flag: HotResetFlag,
}

impl LinkControlCommand {
    pub const fn new(
        control: LinkControl,
        phys_port_id: PhysPortId,
        hot_reset_flag: HotResetFlag,
    ) -> Self {
        Self {
            control,
            phys_port_id,
            hot_reset_flag,
        }
    }
}

impl fmt::Display for LinkControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.control {
            LinkControl::HotReset => write!(
                f,
                "{} port {} ({})",
                self.control, self.phys_port_id, self.hot_reset_flag
            ),
            _ => write!(f, "{} port {}", self.control, self.phys_port_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_link_control_raw() {
        assert_eq!(LinkControl::try_from(3).unwrap(), LinkControl::HotReset);
        assert_eq!(
            LinkControl::try_from(4),
            Err(ParseError::InvalidControlType(4))
        );
        assert_eq!(LinkControl::Retrain.as_raw(), 2);
    }

    #[test]
    fn test_hot_reset_flag_raw() {
        assert_eq!(HotResetFlag::try_from(1).unwrap(), HotResetFlag::Set);
        assert_eq!(
            HotResetFlag::try_from(2),
            Err(ParseError::InvalidHotResetFlag(2))
        );
        assert_eq!(HotResetFlag::default(), HotResetFlag::Clear);
    }

    #[test]
    fn test_command_display() {
        let cmd = LinkControlCommand::new(LinkControl::HotReset, 7, HotResetFlag::Set);
        assert_eq!(cmd.to_string(), "hot-reset port 7 (set)");

        let cmd = LinkControlCommand::new(LinkControl::Disable, 0, HotResetFlag::Clear);
        assert_eq!(cmd.to_string(), "disable port 0");
    }
}
