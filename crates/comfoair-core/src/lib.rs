//! comfoair-core
//!
//! Transport-agnostic view of a ComfoAir heat-recovery ventilation unit:
//! - fan presets and their speed codes
//! - status records decoded from the unit
//! - input validation errors

pub mod preset;
pub mod status;
pub mod error;

pub use preset::FanPreset;

pub use status::{
    DeviceInfo,
    FanStatus,
    OperatingTime,
    Status,
    TemperatureStatus,
    ValveStatus,
};

pub use error::InvalidInput;
