//! Inbound commands.
//!
//! Commands arrive as text lines, one per message:
//!
//! ```text
//! <prefix>/fan/cmd ON
//! <prefix>/fan/cmd OFF
//! <prefix>/fan/preset/cmd mid
//! state
//! ```
//!
//! A bad line or a failed command is logged; the reader keeps going.

use std::sync::Arc;

use comfoair_client::Link;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, warn};

use crate::state::StateCache;
use crate::types::{blocking, SharedClient, Topics};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    /// Switch the fan on (restoring the remembered preset) or off.
    Fan(bool),
    /// Select a preset by name.
    Preset(String),
    /// Report the cached operating-time summary.
    State,
}

/// Map a `(topic, payload)` message to a command.
///
/// Returns `None` for topics the bridge does not subscribe to.
pub fn parse_command(topics: &Topics, topic: &str, payload: &str) -> Option<BridgeCommand> {
    if topic == topics.fan_command() {
        Some(BridgeCommand::Fan(payload != "OFF"))
    } else if topic == topics.fan_preset_command() {
        Some(BridgeCommand::Preset(payload.to_string()))
    } else {
        None
    }
}

/// Parse one input line: `state`, or `<topic> <payload>`.
pub fn parse_line(topics: &Topics, line: &str) -> Option<BridgeCommand> {
    let line = line.trim();
    if line == "state" {
        return Some(BridgeCommand::State);
    }

    let (topic, payload) = line.split_once(' ').unwrap_or((line, ""));
    parse_command(topics, topic, payload.trim())
}

/// Execute one command against the engine.
pub async fn handle_command<L: Link + 'static>(
    client: &SharedClient<L>,
    cache: &StateCache,
    command: BridgeCommand,
) -> anyhow::Result<()> {
    match command {
        BridgeCommand::Fan(on) => {
            blocking(client, move |c| c.toggle_fan(on)).await?;
            info!(on, "Toggled fan");
        }
        BridgeCommand::Preset(name) => {
            let label = name.clone();
            blocking(client, move |c| c.set_fan_preset(&name)).await?;
            info!(preset = %label, "Set fan preset");
        }
        BridgeCommand::State => {
            let state = cache.get(client).await?;
            info!(state = %state.to_json()?, "Operating time");
        }
    }

    Ok(())
}

/// Read command lines until EOF.
pub async fn run_command_reader<L, R>(
    client: SharedClient<L>,
    cache: Arc<StateCache>,
    topics: Topics,
    reader: R,
) -> anyhow::Result<()>
where
    L: Link + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = parse_line(&topics, &line) else {
            warn!(%line, "Ignoring unknown command");
            continue;
        };

        debug!(?command, "Received command");
        if let Err(e) = handle_command(&client, &cache, command).await {
            error!("Command failed: {:#}", e);
        }
    }

    Ok(())
}
