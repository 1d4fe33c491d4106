//! comfoair-client
//!
//! Blocking protocol engine for a ComfoAir unit on a serial line.
//!
//! - [`link`]   : one open → write → settle → read → close cycle per request
//! - [`client`] : semantic requests, serialised through one lock
//! - [`error`]  : link / protocol / input failures

pub mod error;
pub mod link;
pub mod client;

pub use client::ComfoairClient;
pub use error::{ClientError, LinkError, Result};
pub use link::{Link, SerialLink, SerialSettings};
