//! The protocol engine.
//!
//! [`ComfoairClient`] turns semantic requests ("get fan status", "set
//! preset mid") into framed transactions on a [`Link`]:
//! - every transaction holds one lock for its full write → read cycle,
//! - replies are validated before any payload byte is decoded,
//! - nothing is cached except the preset to restore when the fan is
//!   toggled back on.
//!
//! Calls block for the settle interval plus I/O latency. Share one client
//! (e.g. in an `Arc`) between pollers and command handlers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use comfoair_core::{
    DeviceInfo, FanPreset, FanStatus, OperatingTime, Status, TemperatureStatus, ValveStatus,
};
use comfoair_protocol::{
    decode_device_info, decode_fan_status, decode_operating_time, decode_response,
    decode_temperature_status, decode_valve_status, encode_request, Command, ProtocolError,
};
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::link::{Link, SerialLink, SerialSettings};

/// Protocol engine for one unit.
pub struct ComfoairClient<L> {
    inner: Mutex<Inner<L>>,
}

/// Everything behind the transaction lock.
struct Inner<L> {
    link: L,

    /// Last non-off preset seen when the fan was toggled off.
    remembered_preset: Option<FanPreset>,
}

impl ComfoairClient<SerialLink> {
    /// Engine talking to a local serial port.
    pub fn open(settings: SerialSettings) -> Self {
        ComfoairClient::new(SerialLink::new(settings))
    }
}

impl<L: Link> ComfoairClient<L> {
    /// Create an engine with no remembered preset.
    pub fn new(link: L) -> Self {
        ComfoairClient {
            inner: Mutex::new(Inner {
                link,
                remembered_preset: None,
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn get_device_info(&self) -> Result<DeviceInfo> {
        self.lock().read(Command::DeviceInfo, decode_device_info)
    }

    pub fn get_fan_status(&self) -> Result<FanStatus> {
        self.lock().fan_status()
    }

    pub fn get_valve_status(&self) -> Result<ValveStatus> {
        self.lock().read(Command::ValveStatus, decode_valve_status)
    }

    pub fn get_temperature_status(&self) -> Result<TemperatureStatus> {
        self.lock().read(Command::TemperatureStatus, decode_temperature_status)
    }

    pub fn get_operating_time(&self) -> Result<OperatingTime> {
        self.lock().read(Command::OperatingTime, decode_operating_time)
    }

    /// Temperature, fan and valve status as three separate transactions.
    ///
    /// Other callers may get their requests in between; the parts are not
    /// one device sample.
    pub fn get_status(&self) -> Result<Status> {
        let temperature = self.get_temperature_status()?;
        let fan = self.get_fan_status()?;
        let valve = self.get_valve_status()?;

        Ok(Status {
            temperature,
            fan,
            valve,
        })
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Select a preset by its bus label (`""` means `low`).
    ///
    /// Unknown labels are rejected before anything is written.
    pub fn set_fan_preset(&self, name: &str) -> Result<()> {
        let preset = FanPreset::from_name(name)?;
        info!(%preset, "Setting fan speed");
        self.lock().set_speed(preset)
    }

    /// Select a preset by raw speed code (`1..=4`).
    pub fn set_fan_speed(&self, code: u8) -> Result<()> {
        let preset = FanPreset::from_speed_code(code)?;
        info!(code, %preset, "Setting fan speed");
        self.lock().set_speed(preset)
    }

    /// Switch the fan off, remembering the running preset, or back on to
    /// the remembered preset (`low` if none).
    ///
    /// The status read and the speed command run under one lock.
    pub fn toggle_fan(&self, on: bool) -> Result<()> {
        info!(on, "Toggling fan");
        let mut inner = self.lock();

        if on {
            let preset = inner.remembered_preset.unwrap_or_default();
            return inner.set_speed(preset);
        }

        let current = match inner.fan_status() {
            Ok(status) => status.preset,
            Err(e) => {
                warn!(error = %e, "Could not read fan status before switching off, assuming low");
                FanPreset::Low
            }
        };

        if !current.is_off() {
            inner.remembered_preset = Some(current);
        }

        inner.set_speed(FanPreset::Off)
    }

    /// Preset `toggle_fan(true)` would restore, if one was remembered.
    pub fn remembered_preset(&self) -> Option<FanPreset> {
        self.lock().remembered_preset
    }

    /// Forget the remembered preset; the next "on" selects `low`.
    pub fn reset_toggle_memory(&self) {
        self.lock().remembered_preset = None;
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// A caller that panicked mid-transaction leaves no partial state
    /// worth protecting; carry on with the inner value.
    fn lock(&self) -> MutexGuard<'_, Inner<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L: Link> Inner<L> {
    /// One framed transaction. Returns the raw reply.
    fn execute(&mut self, command: Command, payload: &[u8]) -> Result<Vec<u8>> {
        let mut request = Vec::with_capacity(payload.len() + 8);
        encode_request(command.opcode(), payload, &mut request)
            .map_err(|e| ClientError::protocol(e, &[]))?;

        debug!("{:?} -> {:02x?}", command, request);
        let raw = self.link.exchange(&request)?;
        debug!("{:?} <- {:02x?}", command, raw);

        Ok(raw)
    }

    fn read<T>(&mut self, command: Command, decode: fn(&[u8]) -> std::result::Result<T, ProtocolError>) -> Result<T> {
        let raw = self.execute(command, &[])?;
        decode_response(&raw, command.opcode())
            .and_then(decode)
            .map_err(|e| ClientError::protocol(e, &raw))
    }

    fn fan_status(&mut self) -> Result<FanStatus> {
        let (status, anomaly) = self.read(Command::FanStatus, decode_fan_status)?;
        if let Some(anomaly) = anomaly {
            warn!(%anomaly, preset = %status.preset, "Fan preset decoded with fallback");
        }
        Ok(status)
    }

    fn set_speed(&mut self, preset: FanPreset) -> Result<()> {
        let command = Command::SetFanSpeed;
        let raw = self.execute(command, &[preset.speed_code()])?;
        decode_response(&raw, command.opcode()).map_err(|e| ClientError::protocol(e, &raw))?;
        Ok(())
    }
}
