//! Top-level bridge wiring.
//!
//! This module:
//! - Opens the engine on the configured serial port.
//! - Logs what the unit reports about itself.
//! - Spawns the fan-state and sensor pollers, each under a supervisor.
//! - Feeds command lines from stdin to the engine until EOF, then waits
//!   for Ctrl-C.

use std::sync::Arc;

use comfoair_client::{ComfoairClient, Link};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::commands::run_command_reader;
use crate::config::Config;
use crate::poller::{FanStatePoller, SensorPoller};
use crate::state::{StateCache, StateResponse};
use crate::supervisor::supervise;
use crate::types::{blocking, SharedClient, SharedPublisher, Topics};

/// Run the bridge against the serial port named in `config`.
pub async fn run(config: Config, publisher: SharedPublisher) -> anyhow::Result<()> {
    let settings = config.serial_settings();
    info!(port = %settings.port, baud = settings.baud_rate, "Opening serial link");

    let client: SharedClient<_> = Arc::new(ComfoairClient::open(settings));
    let stdin = BufReader::new(tokio::io::stdin());

    let pollers = start(&config, client.clone(), publisher);

    if let Err(e) = serve_commands(&config, client, stdin).await {
        warn!("Command input closed: {:#}", e);
    }

    info!("Command input finished, waiting for Ctrl-C");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    for handle in pollers {
        handle.abort();
    }

    Ok(())
}

/// Log the unit's identity and spawn both supervised pollers.
///
/// Startup reads are informational; a failure is logged and the pollers
/// start anyway.
pub fn start<L: Link + 'static>(
    config: &Config,
    client: SharedClient<L>,
    publisher: SharedPublisher,
) -> Vec<JoinHandle<()>> {
    let topics = Topics::new(config.bridge.topic_prefix.clone());
    let retain = config.bridge.retain;
    let backoff = config.restart_backoff();

    {
        let client = client.clone();
        tokio::spawn(async move { log_startup(&client).await });
    }

    let fan = {
        let (client, publisher, topics) = (client.clone(), publisher.clone(), topics.clone());
        let period = config.fan_poll_interval();
        tokio::spawn(supervise("fan-state", backoff, move || {
            FanStatePoller::new(client.clone(), publisher.clone(), topics.clone(), retain).run(period)
        }))
    };

    let sensors = {
        let period = config.sensor_poll_interval();
        tokio::spawn(supervise("sensors", backoff, move || {
            SensorPoller::new(client.clone(), publisher.clone(), topics.clone(), retain).run(period)
        }))
    };

    vec![fan, sensors]
}

async fn log_startup<L: Link + 'static>(client: &SharedClient<L>) {
    match blocking(client, |c| c.get_device_info()).await {
        Ok(device) => info!(
            "Connected to {} (v{}.{})",
            device.device_name, device.major_version, device.minor_version
        ),
        Err(e) => warn!("Failed to get device info: {:#}", e),
    }

    match blocking(client, |c| c.get_operating_time()).await {
        Ok(time) => {
            let state = StateResponse::from_operating_time(&time, chrono::Utc::now());
            info!(
                filter_days = state.filter_days,
                total_days = state.total_days,
                "Operating time"
            );
        }
        Err(e) => warn!("Failed to get operating time: {:#}", e),
    }
}

/// Feed command lines from `reader` to the engine until EOF.
pub async fn serve_commands<L, R>(config: &Config, client: SharedClient<L>, reader: R) -> anyhow::Result<()>
where
    L: Link + 'static,
    R: AsyncBufRead + Unpin,
{
    let cache = Arc::new(StateCache::new(config.state_cache_ttl()));
    let topics = Topics::new(config.bridge.topic_prefix.clone());
    run_command_reader(client, cache, topics, reader).await
}
