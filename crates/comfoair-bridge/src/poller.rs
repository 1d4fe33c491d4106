//! Polling loops.
//!
//! Two independent loops share the engine:
//! - the fan-state poller publishes on/off and the preset when it changes,
//! - the sensor poller reads the aggregate status and publishes every
//!   sensor in [`SENSORS`].
//!
//! A failed read ends the loop with an error; the supervisor restarts it.
//! A failed publish is logged and retried on the next tick.

use std::time::Duration;

use anyhow::Context;
use comfoair_client::Link;
use comfoair_core::FanPreset;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::sensors::SENSORS;
use crate::types::{blocking, SharedClient, SharedPublisher, Topics};

/// Publishes fan on/off state and preset.
pub struct FanStatePoller<L> {
    client: SharedClient<L>,
    publisher: SharedPublisher,
    topics: Topics,
    retain: bool,

    /// Preset last published; `None` until the first publish succeeds.
    last_preset: Option<FanPreset>,
}

impl<L: Link + 'static> FanStatePoller<L> {
    pub fn new(client: SharedClient<L>, publisher: SharedPublisher, topics: Topics, retain: bool) -> Self {
        FanStatePoller {
            client,
            publisher,
            topics,
            retain,
            last_preset: None,
        }
    }

    /// Poll every `period` until a read fails.
    pub async fn run(mut self, period: Duration) -> anyhow::Result<()> {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await?;
        }
    }

    pub async fn poll_once(&mut self) -> anyhow::Result<()> {
        let fan = blocking(&self.client, |c| c.get_fan_status())
            .await
            .context("Retrieving fan status failed")?;

        if self.last_preset == Some(fan.preset) {
            return Ok(());
        }

        let state = if fan.preset.is_off() { "OFF" } else { "ON" };
        debug!(state, preset = %fan.preset, "Fan state changed");

        let published = self
            .publisher
            .publish(&self.topics.fan_state(), state, self.retain)
            .and_then(|()| {
                self.publisher
                    .publish(&self.topics.fan_preset_state(), fan.preset.as_str(), self.retain)
            });

        match published {
            Ok(()) => self.last_preset = Some(fan.preset),
            Err(e) => warn!(error = %e, "Publishing fan state failed"),
        }

        Ok(())
    }

    pub fn last_preset(&self) -> Option<FanPreset> {
        self.last_preset
    }
}

/// Publishes every sensor from one aggregate status read.
pub struct SensorPoller<L> {
    client: SharedClient<L>,
    publisher: SharedPublisher,
    topics: Topics,
    retain: bool,
}

impl<L: Link + 'static> SensorPoller<L> {
    pub fn new(client: SharedClient<L>, publisher: SharedPublisher, topics: Topics, retain: bool) -> Self {
        SensorPoller {
            client,
            publisher,
            topics,
            retain,
        }
    }

    pub async fn run(self, period: Duration) -> anyhow::Result<()> {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once().await?;
        }
    }

    pub async fn poll_once(&self) -> anyhow::Result<()> {
        let status = blocking(&self.client, |c| c.get_status())
            .await
            .context("Failed to get status")?;

        for sensor in &SENSORS {
            let value = (sensor.read)(&status).to_string();
            let topic = self.topics.sensor_state(sensor);

            if let Err(e) = self.publisher.publish(&topic, &value, self.retain) {
                warn!(%topic, error = %e, "Publishing sensor failed");
            }
        }

        Ok(())
    }
}
