//! Payload decoding for each read command.
//!
//! Layouts (offsets into the validated reply payload):
//!
//! ```text
//! DeviceInfo (0x0069 → 0x006A):
//!   [0]      major version
//!   [1]      minor version
//!   [2]      (unused)
//!   [3..]    device name (text)
//!
//! FanStatus (0x000B → 0x000C):
//!   [0]      supply fan code (%)
//!   [1]      exhaust fan code (%)
//!   [2..4]   supply tacho period (u16 BE)
//!   [4..6]   exhaust tacho period (u16 BE)
//!
//! ValveStatus (0x000D → 0x000E):
//!   [0]      bypass (%; 0xFF = undefined)
//!   [1]      pre-heater (1 = active, 2 = undefined)
//!   [2]      bypass motor current
//!   [3]      pre-heater motor current
//!
//! TemperatureStatus (0x00D1 → 0x00D2):
//!   [0..5]   comfort, outside, supply, exhaust, return (°C * 2 + 40)
//!
//! OperatingTime (0x00DD → 0x00DE):
//!   [3..6]   hours at low speed (u24 BE)
//!   [6..9]   hours at medium speed (u24 BE)
//!   [15..17] hours since filter change (u16 BE)
//!   [17..20] hours at high speed (u24 BE)
//! ```
//!
//! All functions here are pure. A payload that is too short for its
//! layout is a [`ProtocolError::PayloadTooShort`], never a panic.

use std::fmt;

use comfoair_core::{DeviceInfo, FanPreset, FanStatus, OperatingTime, TemperatureStatus, ValveStatus};

use crate::frame_codec::ProtocolError;
use crate::Command;

/// Numerator turning a tacho period into revolutions per minute.
pub const RPM_NUMERATOR: u32 = 1_875_000;

/// Bypass value the unit uses for "undefined".
pub const BYPASS_UNDEFINED: u8 = 0xFF;

/// Something odd in a reply that is tolerated rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeAnomaly {
    /// Supply fan code matched no preset; decoded as `low`.
    UnknownFanPreset { code: u8 },
}

impl fmt::Display for DecodeAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeAnomaly::UnknownFanPreset { code } => {
                write!(f, "Unexpected fan speed for preset conversion: {}", code)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Scalar conversions
// -----------------------------------------------------------------------------

/// Half degrees with a +20 °C offset: `0x28` is 0.0 °C, `0xFF` is 107.5 °C.
pub fn temperature(raw: u8) -> f32 {
    raw as f32 / 2.0 - 20.0
}

/// Revolutions per minute from a big-endian tacho period.
///
/// A zero period (fan standing still) decodes to 0 rpm.
pub fn fan_rpm(period: [u8; 2]) -> u32 {
    match u16::from_be_bytes(period) {
        0 => 0,
        p => RPM_NUMERATOR / p as u32,
    }
}

/// Map a supply fan code to a preset.
pub fn classify_fan_preset(code: u8) -> Result<FanPreset, DecodeAnomaly> {
    match code {
        15 => Ok(FanPreset::Off),
        35 => Ok(FanPreset::Low),
        50 => Ok(FanPreset::Mid),
        70 => Ok(FanPreset::High),
        _ => Err(DecodeAnomaly::UnknownFanPreset { code }),
    }
}

pub fn bypass_percent(raw: u8) -> u8 {
    if raw == BYPASS_UNDEFINED {
        0
    } else {
        raw
    }
}

/// Only code 1 means active; 2 is documented as undefined.
pub fn pre_heating_active(raw: u8) -> bool {
    raw == 1
}

// -----------------------------------------------------------------------------
// Payload decoders
// -----------------------------------------------------------------------------

pub fn decode_device_info(payload: &[u8]) -> Result<DeviceInfo, ProtocolError> {
    require(Command::DeviceInfo, payload, 3)?;

    Ok(DeviceInfo {
        major_version: payload[0],
        minor_version: payload[1],
        device_name: String::from_utf8_lossy(&payload[3..]).into_owned(),
    })
}

/// Decode fan status. An unknown supply code is reported alongside the
/// (fallback) result instead of failing.
pub fn decode_fan_status(payload: &[u8]) -> Result<(FanStatus, Option<DecodeAnomaly>), ProtocolError> {
    require(Command::FanStatus, payload, 6)?;

    let supply = payload[0];
    let (preset, anomaly) = match classify_fan_preset(supply) {
        Ok(preset) => (preset, None),
        Err(anomaly) => (FanPreset::Low, Some(anomaly)),
    };

    let status = FanStatus {
        supply,
        exhaust: payload[1],
        preset,
        preset_fallback: anomaly.is_some(),
        supply_rpm: fan_rpm([payload[2], payload[3]]),
        exhaust_rpm: fan_rpm([payload[4], payload[5]]),
    };

    Ok((status, anomaly))
}

pub fn decode_valve_status(payload: &[u8]) -> Result<ValveStatus, ProtocolError> {
    require(Command::ValveStatus, payload, 4)?;

    Ok(ValveStatus {
        bypass: bypass_percent(payload[0]),
        pre_heating: pre_heating_active(payload[1]),
        bypass_motor_current: payload[2],
        pre_heating_motor_current: payload[3],
    })
}

pub fn decode_temperature_status(payload: &[u8]) -> Result<TemperatureStatus, ProtocolError> {
    require(Command::TemperatureStatus, payload, 5)?;

    Ok(TemperatureStatus {
        comfort: temperature(payload[0]),
        outside: temperature(payload[1]),
        supply: temperature(payload[2]),
        exhaust: temperature(payload[3]),
        r#return: temperature(payload[4]),
    })
}

pub fn decode_operating_time(payload: &[u8]) -> Result<OperatingTime, ProtocolError> {
    require(Command::OperatingTime, payload, 20)?;

    Ok(OperatingTime {
        low_hours: read_u24_be(&payload[3..6]),
        medium_hours: read_u24_be(&payload[6..9]),
        high_hours: read_u24_be(&payload[17..20]),
        filter_hours: read_u16_be(&payload[15..17]) as u32,
    })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn require(command: Command, payload: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if payload.len() < needed {
        return Err(ProtocolError::PayloadTooShort {
            command,
            needed,
            available: payload.len(),
        });
    }
    Ok(())
}

/// Zero-extend three big-endian bytes into a `u32`.
fn read_u24_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]])
}

fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}
