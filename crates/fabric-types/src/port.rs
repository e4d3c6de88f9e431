//! Physical port configuration types.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical port number on the switch.
///
/// The valid range is only known to the device.
pub type PhysPortId = u8;

/// Label shown for device-reported values outside a known enumeration.
pub const INVALID_LABEL: &str = "Invalid";

/// Role of a physical port in the fabric.
///
/// `FabricLink` is derived by the switch and is never accepted as a
/// configuration value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PortType {
    /// Unused
    #[cfg_attr(feature = "clap", value(name = "UNUSED"))]
    Unused = 0,
    /// Fabric Link
    #[cfg_attr(feature = "clap", value(skip))]
    FabricLink = 1,
    /// Fabric EP
    #[cfg_attr(feature = "clap", value(name = "FABRIC_EP"))]
    FabricEp = 2,
    /// Fabric Host
    #[cfg_attr(feature = "clap", value(name = "FABRIC_HOST"))]
    FabricHost = 3,
}

impl PortType {
    /// Returns the raw value used on the wire.
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Returns true if the port type may be written by a port config set.
    pub const fn is_settable(self) -> bool {
        !matches!(self, PortType::FabricLink)
    }

    /// Returns the human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            PortType::Unused => "Unused",
            PortType::FabricLink => "Fabric Link",
            PortType::FabricEp => "Fabric EP",
            PortType::FabricHost => "Fabric Host",
        }
    }
}

impl TryFrom<u8> for PortType {
    type Error = ParseError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(PortType::Unused),
            1 => Ok(PortType::FabricLink),
            2 => Ok(PortType::FabricEp),
            3 => Ok(PortType::FabricHost),
            _ => Err(ParseError::InvalidPortType(raw)),
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference clock mode of a physical port.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ClockMode {
    /// Common clock without SSC
    #[cfg_attr(feature = "clap", value(name = "COMMON"))]
    CommonNoSsc = 0,
    /// Non-common clock without SSC (SRNS)
    #[cfg_attr(feature = "clap", value(name = "SRNS"))]
    NonCommonNoSsc = 1,
    /// Common clock with SSC
    #[cfg_attr(feature = "clap", value(name = "COMMON_SSC"))]
    CommonSsc = 2,
    /// Non-common clock with SSC (SRIS)
    #[cfg_attr(feature = "clap", value(name = "SRIS"))]
    NonCommonSsc = 3,
}

impl ClockMode {
    /// Returns the raw value used on the wire.
    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    /// Returns the human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            ClockMode::CommonNoSsc => "Common clock without SSC",
            ClockMode::NonCommonNoSsc => "Non-common clock without SSC (SRNS)",
            ClockMode::CommonSsc => "Common clock with SSC",
            ClockMode::NonCommonSsc => "Non-common clock with SSC (SRIS)",
        }
    }
}

impl TryFrom<u8> for ClockMode {
    type Error = ParseError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ClockMode::CommonNoSsc),
            1 => Ok(ClockMode::NonCommonNoSsc),
            2 => Ok(ClockMode::CommonSsc),
            3 => Ok(ClockMode::NonCommonSsc),
            _ => Err(ParseError::InvalidClockMode(raw)),
        }
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A complete, settable port configuration.
///
/// The constructor refuses port types that cannot be written, so a value of
/// this type is always acceptable to a port config set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PortConfig {
    port_type: PortType,
    /// CSU channel index used as the port clock source.
    pub clock_source: u8,
    /// Reference clock mode.
    pub clock_mode: ClockMode,
    /// HVD (virtual host domain) index, used by upstream ports.
    pub hvd_instance: u8,
}

impl PortConfig {
    /// Creates a new port configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::PortTypeNotSettable`] for `FabricLink`.
    pub fn new(
        port_type: PortType,
        clock_source: u8,
        clock_mode: ClockMode,
        hvd_instance: u8,
    ) -> Result<Self, ParseError> {
        if !port_type.is_settable() {
            return Err(ParseError::PortTypeNotSettable(port_type));
        }
        Ok(Self {
            port_type,
            clock_source,
            clock_mode,
            hvd_instance,
        })
    }

    /// Returns the port type.
    pub const fn port_type(&self) -> PortType {
        self.port_type
    }
}

/// Port configuration as reported by the device.
///
/// Enumerated fields are kept raw. Values outside the known range are only
/// mapped to [`INVALID_LABEL`] for display and can never be turned back into
/// a [`PortConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortConfigInfo {
    pub port_type: u8,
    pub clock_source: u8,
    pub clock_mode: u8,
    pub hvd_instance: u8,
}

impl PortConfigInfo {
    /// Returns the decoded port type, if it is in range.
    pub fn port_type(&self) -> Option<PortType> {
        PortType::try_from(self.port_type).ok()
    }

    /// Returns the decoded clock mode, if it is in range.
    pub fn clock_mode(&self) -> Option<ClockMode> {
        ClockMode::try_from(self.clock_mode).ok()
    }

    pub fn port_type_label(&self) -> &'static str {
        self.port_type().map_or(INVALID_LABEL, PortType::label)
    }

    pub fn clock_mode_label(&self) -> &'static str {
        self.clock_mode().map_or(INVALID_LABEL, ClockMode::label)
    }

    /// Converts the report back into a settable configuration.
    ///
    /// Fails for out-of-range enumerations and for `FabricLink` ports.
    pub fn to_config(&self) -> Result<PortConfig, ParseError> {
        PortConfig::new(
            PortType::try_from(self.port_type)?,
            self.clock_source,
            ClockMode::try_from(self.clock_mode)?,
            self.hvd_instance,
        )
    }
}

impl From<PortConfig> for PortConfigInfo {
    fn from(config: PortConfig) -> Self {
        Self {
            port_type: config.port_type.as_raw(),
            clock_source: config.clock_source,
            clock_mode: config.clock_mode.as_raw(),
            hvd_instance: config.hvd_instance,
        }
    }
}

impl fmt::Display for PortConfigInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Port Type:    {}", self.port_type_label())?;
        writeln!(f, "Clock Source: {}", self.clock_source)?;
        writeln!(f, "Clock Mode:   {}", self.clock_mode_label())?;
        writeln!(f, "Hvd Instance: {}", self.hvd_instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_type_raw() {
        for raw in 0..4u8 {
            assert_eq!(PortType::try_from(raw).unwrap().as_raw(), raw);
        }
        assert_eq!(PortType::try_from(4), Err(ParseError::InvalidPortType(4)));
    }

    #[test]
    fn test_clock_mode_raw() {
        for raw in 0..4u8 {
            assert_eq!(ClockMode::try_from(raw).unwrap().as_raw(), raw);
        }
        assert_eq!(
            ClockMode::try_from(0xff),
            Err(ParseError::InvalidClockMode(0xff))
        );
    }

    #[test]
    fn test_fabric_link_not_settable() {
        assert!(!PortType::FabricLink.is_settable());
        assert_eq!(
            PortConfig::new(PortType::FabricLink, 0, ClockMode::CommonNoSsc, 0),
            Err(ParseError::PortTypeNotSettable(PortType::FabricLink))
        );
        assert!(PortConfig::new(PortType::FabricEp, 0, ClockMode::CommonNoSsc, 0).is_ok());
    }

    #[test]
    fn test_info_labels_clamp() {
        let info = PortConfigInfo {
            port_type: 4,
            clock_source: 1,
            clock_mode: 9,
            hvd_instance: 0,
        };
        assert_eq!(info.port_type_label(), "Invalid");
        assert_eq!(info.clock_mode_label(), "Invalid");
        assert!(info.to_config().is_err());
    }

    #[test]
    fn test_info_display() {
        let config = PortConfig::new(PortType::FabricHost, 2, ClockMode::NonCommonSsc, 1).unwrap();
        let info = PortConfigInfo::from(config);
        assert_eq!(
            info.to_string(),
            "Port Type:    Fabric Host\n\
             Clock Source: 2\n\
             Clock Mode:   Non-common clock with SSC (SRIS)\n\
             Hvd Instance: 1\n"
        );
        assert_eq!(info.to_config().unwrap(), config);
    }

    #[test]
    fn test_fabric_link_info_is_displayable() {
        let info = PortConfigInfo {
            port_type: PortType::FabricLink.as_raw(),
            clock_source: 0,
            clock_mode: 0,
            hvd_instance: 0,
        };
        assert_eq!(info.port_type_label(), "Fabric Link");
        assert!(info.to_config().is_err());
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&PortType::FabricEp).unwrap();
        assert_eq!(json, "\"fabric_ep\"");
        let mode: ClockMode = serde_json::from_str("\"common_ssc\"").unwrap();
        assert_eq!(mode, ClockMode::CommonSsc);
    }
}
