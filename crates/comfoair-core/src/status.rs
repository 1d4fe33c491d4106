//! Status records read from the unit.
//!
//! These are plain value objects, built fresh for every request. Nothing
//! in here knows about frames or serial ports; decoding from payload
//! bytes lives in the `comfoair-protocol` crate.

use crate::preset::FanPreset;

/// Firmware identification reported by the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub major_version: u8,
    pub minor_version: u8,

    /// Trailing payload bytes as text, e.g. `"ComfoAir 350"`.
    pub device_name: String,
}

/// Fan state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanStatus {
    /// Raw supply fan code (percentage of nominal speed).
    pub supply: u8,

    /// Raw exhaust fan code.
    pub exhaust: u8,

    /// Preset derived from the supply code.
    ///
    /// When the supply code matches no known preset this falls back to
    /// [`FanPreset::Low`] and `preset_fallback` is set.
    pub preset: FanPreset,
    pub preset_fallback: bool,

    /// Supply fan speed in rpm; `0` when the unit reports no tacho period.
    pub supply_rpm: u32,

    /// Exhaust fan speed in rpm; `0` when the unit reports no tacho period.
    pub exhaust_rpm: u32,
}

/// Bypass and pre-heater valves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValveStatus {
    /// Bypass opening in percent. The "undefined" marker decodes to `0`.
    pub bypass: u8,
    pub pre_heating: bool,
    pub bypass_motor_current: u8,
    pub pre_heating_motor_current: u8,
}

/// Temperatures in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureStatus {
    pub comfort: f32,
    pub outside: f32,
    pub supply: f32,
    pub exhaust: f32,
    pub r#return: f32,
}

/// Accumulated running hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatingTime {
    pub low_hours: u32,
    pub medium_hours: u32,
    pub high_hours: u32,
    pub filter_hours: u32,
}

impl OperatingTime {
    /// Hours spent at any fan speed.
    pub fn total_hours(&self) -> u32 {
        self.low_hours + self.medium_hours + self.high_hours
    }
}

/// Aggregate of three independent reads.
///
/// The three parts are not sampled at the same instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub temperature: TemperatureStatus,
    pub fan: FanStatus,
    pub valve: ValveStatus,
}
