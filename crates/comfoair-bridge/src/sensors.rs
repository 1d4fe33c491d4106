//! Sensors republished from the aggregate [`Status`].
//!
//! Each entry is a pure projection; the sensor poller walks the table
//! after every status read.

use std::fmt;

use comfoair_core::Status;

/// A projected reading, rendered the way the bus expects it
/// (`21.5`, `20`, `1041`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    Celsius(f32),
    Rpm(u32),
    Percent(u8),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Celsius(v) => write!(f, "{}", v),
            SensorValue::Rpm(v) => write!(f, "{}", v),
            SensorValue::Percent(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Clone, Copy)]
pub struct SensorDefinition {
    pub name: &'static str,

    /// Home-automation device class, if any.
    pub class: Option<&'static str>,
    pub unit: &'static str,
    pub read: fn(&Status) -> SensorValue,
}

impl fmt::Debug for SensorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorDefinition")
            .field("name", &self.name)
            .field("class", &self.class)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

impl SensorDefinition {
    /// Lowercased name with spaces replaced by underscores.
    pub fn unique_id(&self) -> String {
        self.name.to_lowercase().replace(' ', "_")
    }
}

pub const SENSORS: [SensorDefinition; 8] = [
    SensorDefinition {
        name: "Comfoair Outside Temperature",
        class: Some("temperature"),
        unit: "°C",
        read: |s| SensorValue::Celsius(s.temperature.outside),
    },
    SensorDefinition {
        name: "Comfoair Exhaust Temperature",
        class: Some("temperature"),
        unit: "°C",
        read: |s| SensorValue::Celsius(s.temperature.exhaust),
    },
    SensorDefinition {
        name: "Comfoair Return Temperature",
        class: Some("temperature"),
        unit: "°C",
        read: |s| SensorValue::Celsius(s.temperature.r#return),
    },
    SensorDefinition {
        name: "Comfoair Supply Temperature",
        class: Some("temperature"),
        unit: "°C",
        read: |s| SensorValue::Celsius(s.temperature.supply),
    },
    SensorDefinition {
        name: "Comfoair Comfort Temperature",
        class: Some("temperature"),
        unit: "°C",
        read: |s| SensorValue::Celsius(s.temperature.comfort),
    },
    SensorDefinition {
        name: "Comfoair Supply Fan Speed",
        class: None,
        unit: "rpm",
        read: |s| SensorValue::Rpm(s.fan.supply_rpm),
    },
    SensorDefinition {
        name: "Comfoair Exhaust Fan Speed",
        class: None,
        unit: "rpm",
        read: |s| SensorValue::Rpm(s.fan.exhaust_rpm),
    },
    SensorDefinition {
        name: "Comfoair Bypass",
        class: None,
        unit: "%",
        read: |s| SensorValue::Percent(s.valve.bypass),
    },
];
