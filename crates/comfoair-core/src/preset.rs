//! Fan presets (off / low / mid / high).

use std::fmt;

use crate::error::InvalidInput;

/// Named fan-speed profile understood by the automation layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FanPreset {
    Off,
    #[default]
    Low,
    Mid,
    High,
}

impl FanPreset {
    /// All presets, in ascending speed order.
    pub const ALL: [FanPreset; 4] = [FanPreset::Off, FanPreset::Low, FanPreset::Mid, FanPreset::High];

    /// Label used on the bus (`"off"`, `"low"`, `"mid"`, `"high"`).
    pub fn as_str(self) -> &'static str {
        match self {
            FanPreset::Off => "off",
            FanPreset::Low => "low",
            FanPreset::Mid => "mid",
            FanPreset::High => "high",
        }
    }

    /// Parse a bus label. The empty string selects the default (`low`).
    pub fn from_name(name: &str) -> Result<Self, InvalidInput> {
        match name {
            "off" => Ok(FanPreset::Off),
            "low" | "" => Ok(FanPreset::Low),
            "mid" => Ok(FanPreset::Mid),
            "high" => Ok(FanPreset::High),
            other => Err(InvalidInput::UnknownPreset(other.to_string())),
        }
    }

    /// Speed code sent with the set-fan-speed command.
    pub fn speed_code(self) -> u8 {
        match self {
            FanPreset::Off => 1,
            FanPreset::Low => 2,
            FanPreset::Mid => 3,
            FanPreset::High => 4,
        }
    }

    /// Inverse of [`FanPreset::speed_code`].
    pub fn from_speed_code(code: u8) -> Result<Self, InvalidInput> {
        match code {
            1 => Ok(FanPreset::Off),
            2 => Ok(FanPreset::Low),
            3 => Ok(FanPreset::Mid),
            4 => Ok(FanPreset::High),
            other => Err(InvalidInput::FanSpeedOutOfRange(other)),
        }
    }

    pub fn is_off(self) -> bool {
        self == FanPreset::Off
    }
}

impl fmt::Display for FanPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
