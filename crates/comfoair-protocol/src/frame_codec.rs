//! Request framing and reply validation.
//!
//! Framing model (one transaction per buffer):
//!
//! ```text
//! Request (bridge → unit)
//! -----------------------
//! [0..2]      : 07 F0            frame start
//! [2..4]      : opcode (u16 BE)
//! [4]         : len (u8)
//! [5..5+len]  : payload
//! [5+len]     : checksum
//! [6+len..]   : 07 0F            frame end
//!
//! checksum = (173 + sum(opcode ‖ len ‖ payload)) & 0xFF
//!
//! Reply (unit → bridge)
//! ---------------------
//! [0..2]      : 07 F3            ACK
//!
//! ... and, for commands that return data:
//! [2..4]      : reserved (not checked)
//! [4..6]      : 00 <opcode[1] + 1>
//! [6]         : len (u8)
//! [7..7+len]  : payload
//! [...]       : checksum, 07 0F  (not checked)
//! ```
//!
//! NOTE: the unit doubles any `0x07` inside a frame body. Neither side of
//! this codec stuffs or unstuffs; the checksum is a plain byte sum over
//! the unstuffed body.

use std::fmt;

use crate::wire_types::{
    response_opcode, ACK, CHECKSUM_SEED, FRAME_END, FRAME_START, MAX_PAYLOAD_LEN,
    RESPONSE_HEADER_LEN,
};
use crate::Command;

/// Errors that can arise when framing a request or checking a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Reply did not start with `07 F3`. Holds the (up to) two bytes seen.
    BadAck { found: Vec<u8> },
    /// Reply echoed a different opcode than expected.
    OpcodeMismatch { expected: [u8; 2], found: [u8; 2] },
    /// Reply shorter than its header or declared length.
    Truncated { needed: usize, available: usize },
    /// Request payload does not fit the one-byte length field.
    PayloadTooLong(usize),
    /// Reply payload shorter than the command's fixed layout.
    PayloadTooShort {
        command: Command,
        needed: usize,
        available: usize,
    },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::BadAck { found } => {
                write!(f, "Didn't receive ACK, received {:02x?} instead", found)
            }
            ProtocolError::OpcodeMismatch { expected, found } => write!(
                f,
                "Unexpected response command: expected {:02x?}, got {:02x?}",
                expected, found
            ),
            ProtocolError::Truncated { needed, available } => {
                write!(f, "Response truncated: need {} bytes, got {}", needed, available)
            }
            ProtocolError::PayloadTooLong(len) => {
                write!(f, "Payload of {} bytes exceeds {}", len, MAX_PAYLOAD_LEN)
            }
            ProtocolError::PayloadTooShort { command, needed, available } => write!(
                f,
                "{:?} payload too short: need {} bytes, got {}",
                command, needed, available
            ),
        }
    }
}

impl std::error::Error for ProtocolError {}

// ============================================================================
// REQUEST: bridge → unit
// ============================================================================

/// Checksum over `opcode ‖ len ‖ payload`.
///
/// The caller guarantees `payload.len() <= 255`; the length byte is the
/// truncated payload length.
pub fn checksum(opcode: [u8; 2], payload: &[u8]) -> u8 {
    let len = payload.len() as u8;
    let sum = opcode
        .iter()
        .chain(std::iter::once(&len))
        .chain(payload)
        .fold(CHECKSUM_SEED, |acc, b| acc + *b as u32);

    (sum & 0xFF) as u8
}

/// Encode a single request frame.
///
/// The encoded bytes are appended to `out`.
pub fn encode_request(opcode: [u8; 2], payload: &[u8], out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    encode_frame(opcode, payload, out)
}

fn encode_frame(opcode: [u8; 2], payload: &[u8], out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    let len = u8::try_from(payload.len()).map_err(|_| ProtocolError::PayloadTooLong(payload.len()))?;

    out.reserve(payload.len() + 8);
    out.extend_from_slice(&FRAME_START);
    out.extend_from_slice(&opcode);
    out.push(len);
    out.extend_from_slice(payload);
    out.push(checksum(opcode, payload));
    out.extend_from_slice(&FRAME_END);

    Ok(())
}

// ============================================================================
// REPLY: unit → bridge
// ============================================================================

/// Encode the reply the unit sends for `request_opcode`.
///
/// ACK followed by a full frame carrying the reply opcode. This is what
/// the bridge expects to read back; simulators and tests use it to stand
/// in for the unit.
pub fn encode_response(
    request_opcode: [u8; 2],
    payload: &[u8],
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLong(payload.len()));
    }

    out.extend_from_slice(&ACK);
    encode_frame(response_opcode(request_opcode), payload, out)
}

/// Check a raw reply to `request_opcode` and return its payload.
///
/// An ACK-only reply (exactly two bytes) yields an empty payload. Reserved
/// bytes and anything after the payload are ignored.
pub fn decode_response(raw: &[u8], request_opcode: [u8; 2]) -> Result<&[u8], ProtocolError> {
    if raw.len() < ACK.len() || raw[..2] != ACK {
        return Err(ProtocolError::BadAck {
            found: raw[..raw.len().min(2)].to_vec(),
        });
    }

    if raw.len() == ACK.len() {
        return Ok(&[]);
    }

    if raw.len() < 6 {
        return Err(ProtocolError::Truncated {
            needed: RESPONSE_HEADER_LEN,
            available: raw.len(),
        });
    }

    let expected = response_opcode(request_opcode);
    let found = [raw[4], raw[5]];
    if found != expected {
        return Err(ProtocolError::OpcodeMismatch { expected, found });
    }

    if raw.len() < RESPONSE_HEADER_LEN {
        return Err(ProtocolError::Truncated {
            needed: RESPONSE_HEADER_LEN,
            available: raw.len(),
        });
    }

    let end = RESPONSE_HEADER_LEN + raw[6] as usize;
    if raw.len() < end {
        return Err(ProtocolError::Truncated {
            needed: end,
            available: raw.len(),
        });
    }

    Ok(&raw[RESPONSE_HEADER_LEN..end])
}
