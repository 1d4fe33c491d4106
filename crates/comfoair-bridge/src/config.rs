//! Configuration for the bridge.
//!
//! Settings come from a TOML file (every key optional):
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 9600
//! settle_ms = 100
//! read_timeout_ms = 1000
//!
//! [bridge]
//! topic_prefix = "comfoair"
//! fan_poll_secs = 1
//! sensor_poll_secs = 10
//! restart_backoff_secs = 1
//! state_cache_secs = 30
//! retain = true
//! ```
//!
//! and a few environment variables override the file:
//!
//! - `COMFOAIR_SERIAL_PORT`
//! - `COMFOAIR_BAUD_RATE`
//! - `COMFOAIR_TOPIC_PREFIX`

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use comfoair_client::SerialSettings;
use serde::Deserialize;

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the RS-232 adapter.
    pub port: String,
    pub baud_rate: u32,

    /// Delay between request and reply read.
    pub settle_ms: u64,

    /// Bound on the reply read.
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            settle_ms: 100,
            read_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub topic_prefix: String,
    pub fan_poll_secs: u64,
    pub sensor_poll_secs: u64,

    /// Pause before a failed poller is restarted.
    pub restart_backoff_secs: u64,

    /// How long the operating-time summary is served from cache.
    pub state_cache_secs: u64,

    /// Ask the bus to retain published state.
    pub retain: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            topic_prefix: "comfoair".to_string(),
            fan_poll_secs: 1,
            sensor_poll_secs: 10,
            restart_backoff_secs: 1,
            state_cache_secs: 30,
            retain: true,
        }
    }
}

impl Config {
    /// Load `path` (defaults if it does not exist), then apply environment
    /// overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Config::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply overrides from a key → value lookup (normally the process
    /// environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("COMFOAIR_SERIAL_PORT") {
            self.serial.port = port;
        }
        self.serial.baud_rate = read_or_default(&lookup, "COMFOAIR_BAUD_RATE", self.serial.baud_rate)?;
        if let Some(prefix) = lookup("COMFOAIR_TOPIC_PREFIX") {
            self.bridge.topic_prefix = prefix;
        }
        Ok(())
    }

    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.serial.port.clone(),
            baud_rate: self.serial.baud_rate,
            settle: Duration::from_millis(self.serial.settle_ms),
            read_timeout: Duration::from_millis(self.serial.read_timeout_ms),
        }
    }

    /// Poll intervals are at least one second; a zero interval is not a
    /// valid timer period.
    pub fn fan_poll_interval(&self) -> Duration {
        Duration::from_secs(self.bridge.fan_poll_secs.max(1))
    }

    pub fn sensor_poll_interval(&self) -> Duration {
        Duration::from_secs(self.bridge.sensor_poll_secs.max(1))
    }

    pub fn restart_backoff(&self) -> Duration {
        Duration::from_secs(self.bridge.restart_backoff_secs)
    }

    pub fn state_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.bridge.state_cache_secs)
    }
}

fn read_or_default<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(val) => val.parse::<T>().with_context(|| format!("invalid {}: {:?}", key, val)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.state_cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.serial_settings().settle, Duration::from_millis(100));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [serial]
            port = "/dev/ttyAMA0"

            [bridge]
            sensor_poll_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.read_timeout_ms, 1000);
        assert_eq!(config.sensor_poll_interval(), Duration::from_secs(30));
        assert_eq!(config.bridge.topic_prefix, "comfoair");
    }

    #[test]
    fn overrides_win_over_file() {
        let mut config = Config::default();
        config
            .apply_overrides(|key| match key {
                "COMFOAIR_SERIAL_PORT" => Some("/dev/ttyS1".to_string()),
                "COMFOAIR_BAUD_RATE" => Some("19200".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.bridge.topic_prefix, "comfoair");
    }

    #[test]
    fn malformed_override_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "COMFOAIR_BAUD_RATE").then(|| "fast".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/comfoair.toml")).unwrap();
        assert_eq!(config.bridge, BridgeConfig::default());
    }
}
