//! comfoair-protocol
//!
//! Wire-level encoding/decoding for the ComfoAir serial protocol.
//!
//! This crate turns a command plus payload into request bytes, checks the
//! unit's raw reply, and decodes reply payloads into `comfoair_core`
//! records. It performs no I/O.
//!
//! - [`wire_types`]    : markers, opcodes, limits
//! - [`frame_codec`]   : request framing, checksum, reply validation
//! - [`payload_codec`] : payload bytes → status records

pub mod wire_types;
pub mod frame_codec;
pub mod payload_codec;

pub use wire_types::Command;

pub use frame_codec::{
    ProtocolError,
    checksum,
    decode_response,
    encode_request,
    encode_response,
};

pub use payload_codec::{
    DecodeAnomaly,
    decode_device_info,
    decode_fan_status,
    decode_operating_time,
    decode_temperature_status,
    decode_valve_status,
};
