//! Shared types for the bridge.
//!
//! This module defines:
//! - `Publisher`: the seam to the message bus, and `TracingPublisher`
//! - `Topics`: topic names derived from the configured prefix
//! - `SharedClient` and `blocking`: running engine calls off the async runtime

use std::sync::Arc;

use comfoair_client::{ComfoairClient, Link};
use tracing::info;

use crate::sensors::SensorDefinition;

/// The engine, shared by pollers and command handlers.
pub type SharedClient<L> = Arc<ComfoairClient<L>>;

/// Outbound side of the message bus.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> anyhow::Result<()>;
}

pub type SharedPublisher = Arc<dyn Publisher>;

/// Publisher that only logs what it would send.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl Publisher for TracingPublisher {
    fn publish(&self, topic: &str, payload: &str, retain: bool) -> anyhow::Result<()> {
        info!(topic, payload, retain, "publish");
        Ok(())
    }
}

/// Topic names under one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    prefix: String,
}

impl Topics {
    pub fn new(prefix: impl Into<String>) -> Self {
        Topics { prefix: prefix.into() }
    }

    pub fn fan_state(&self) -> String {
        format!("{}/fan/state", self.prefix)
    }

    pub fn fan_command(&self) -> String {
        format!("{}/fan/cmd", self.prefix)
    }

    pub fn fan_preset_state(&self) -> String {
        format!("{}/fan/preset/state", self.prefix)
    }

    pub fn fan_preset_command(&self) -> String {
        format!("{}/fan/preset/cmd", self.prefix)
    }

    /// `<prefix>/<class>/<unique_id>`, or `<prefix>/<unique_id>` for
    /// sensors without a device class.
    pub fn sensor_state(&self, sensor: &SensorDefinition) -> String {
        match sensor.class {
            Some(class) => format!("{}/{}/{}", self.prefix, class, sensor.unique_id()),
            None => format!("{}/{}", self.prefix, sensor.unique_id()),
        }
    }
}

/// Run one blocking engine call on the blocking thread pool.
///
/// A panic inside `f` comes back as an error.
pub async fn blocking<L, T, F>(client: &SharedClient<L>, f: F) -> anyhow::Result<T>
where
    L: Link + 'static,
    T: Send + 'static,
    F: FnOnce(&ComfoairClient<L>) -> comfoair_client::Result<T> + Send + 'static,
{
    let client = Arc::clone(client);
    let result = tokio::task::spawn_blocking(move || f(&client)).await?;
    Ok(result?)
}
