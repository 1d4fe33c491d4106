//! Error types for caller-supplied input.
//!
//! Everything here is detected before any byte goes on the wire.

use std::fmt;

/// A command argument the unit would not understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// Preset label outside `off` / `low` / `mid` / `high`.
    UnknownPreset(String),

    /// Fan speed code outside `1..=4`.
    FanSpeedOutOfRange(u8),
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidInput::UnknownPreset(name) => write!(f, "unknown fan preset: {:?}", name),
            InvalidInput::FanSpeedOutOfRange(code) => {
                write!(f, "fan speed code {} out of range 1..=4", code)
            }
        }
    }
}

impl std::error::Error for InvalidInput {}
