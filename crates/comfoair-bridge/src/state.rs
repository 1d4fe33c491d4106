//! Cached operating-time summary.
//!
//! The unit's counters change once an hour at most, so the summary is
//! read from the engine at most once per TTL and served from memory in
//! between.

use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use comfoair_client::Link;
use comfoair_core::OperatingTime;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::{blocking, SharedClient};

const HOURS_PER_DAY: f32 = 24.0;

/// Operating-time counters expressed in days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateResponse {
    pub filter_days: f32,
    pub low_days: f32,
    pub medium_days: f32,
    pub high_days: f32,
    pub total_days: f32,
    pub last_refreshed: DateTime<Utc>,
}

impl StateResponse {
    pub fn from_operating_time(time: &OperatingTime, refreshed: DateTime<Utc>) -> Self {
        let days = |hours: u32| hours as f32 / HOURS_PER_DAY;

        StateResponse {
            filter_days: days(time.filter_hours),
            low_days: days(time.low_hours),
            medium_days: days(time.medium_hours),
            high_days: days(time.high_hours),
            total_days: days(time.total_hours()),
            last_refreshed: refreshed,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug)]
struct Entry {
    fetched_at: Instant,
    response: StateResponse,
}

/// Time-bounded cache over [`StateResponse`].
#[derive(Debug)]
pub struct StateCache {
    ttl: Duration,
    entry: Mutex<Option<Entry>>,
}

impl StateCache {
    pub fn new(ttl: Duration) -> Self {
        StateCache {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Cached response, if one was stored less than `ttl` before `now`.
    pub async fn lookup(&self, now: Instant) -> Option<StateResponse> {
        let entry = self.entry.lock().await;
        entry
            .as_ref()
            .filter(|e| now.saturating_duration_since(e.fetched_at) < self.ttl)
            .map(|e| e.response.clone())
    }

    pub async fn store(&self, now: Instant, response: StateResponse) {
        *self.entry.lock().await = Some(Entry {
            fetched_at: now,
            response,
        });
    }

    /// Serve from the cache, or refresh from the engine when stale.
    ///
    /// A failed refresh drops the stale entry and returns the error.
    pub async fn get<L: Link + 'static>(&self, client: &SharedClient<L>) -> anyhow::Result<StateResponse> {
        let now = Instant::now();
        if let Some(response) = self.lookup(now).await {
            return Ok(response);
        }

        let refreshed = blocking(client, |c| c.get_operating_time()).await;
        let time = match refreshed {
            Ok(time) => time,
            Err(e) => {
                *self.entry.lock().await = None;
                return Err(e).context("Failed to get operating time");
            }
        };

        let response = StateResponse::from_operating_time(&time, Utc::now());
        self.store(now, response.clone()).await;
        debug!("Refreshed state cache");

        Ok(response)
    }
}
