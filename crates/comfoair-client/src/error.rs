//! Error types surfaced by the engine.
//!
//! Nothing here is retried internally; callers decide whether to poll
//! again.

use std::io;

use comfoair_core::InvalidInput;
use comfoair_protocol::ProtocolError;
use thiserror::Error;

/// The physical connection could not complete a transaction.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("cannot open serial port {port}: {source}")]
    Unavailable {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("writing request failed: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("nothing written")]
    NothingWritten,

    /// Read timed out, returned zero bytes or failed.
    #[error("no response")]
    NoResponse,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Link(#[from] LinkError),

    /// Reply rejected by framing or layout checks. `raw` is the reply as read.
    #[error("{error} (raw response {raw:02x?})")]
    Protocol {
        #[source]
        error: ProtocolError,
        raw: Vec<u8>,
    },

    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
}

impl ClientError {
    pub fn protocol(error: ProtocolError, raw: &[u8]) -> Self {
        ClientError::Protocol {
            error,
            raw: raw.to_vec(),
        }
    }

    /// The protocol failure, if this is one.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            ClientError::Protocol { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
