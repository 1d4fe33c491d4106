//! comfoair-bridge
//!
//! Runtime around the protocol engine: supervised pollers that republish
//! the unit's state, handlers for inbound fan commands, and the cached
//! operating-time summary.

pub mod config;
pub mod types;
pub mod sensors;
pub mod poller;
pub mod supervisor;
pub mod commands;
pub mod state;
pub mod bridge;
