//! Low-level wire types and constants.
//!
//! This module defines:
//! - The fixed framing markers.
//! - The command opcodes this bridge uses.
//! - The request → reply opcode relation.
//!
//! The actual encode/decode logic lives in `frame_codec`.

/// Start of every request frame (and of the frame the unit sends back).
pub const FRAME_START: [u8; 2] = [0x07, 0xF0];

/// End of every frame.
pub const FRAME_END: [u8; 2] = [0x07, 0x0F];

/// Prefix the unit sends to acknowledge a request.
pub const ACK: [u8; 2] = [0x07, 0xF3];

/// Initial value of the checksum accumulator.
pub const CHECKSUM_SEED: u32 = 173;

/// The length field is a single byte.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// `ACK(2) | reserved(2) | opcode(2) | len(1)` in front of a reply payload.
pub const RESPONSE_HEADER_LEN: usize = 7;

/// Commands (opcodes) understood by the unit.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Firmware version and device name.
    DeviceInfo = 0x0069,

    /// Fan codes and tacho periods.
    FanStatus = 0x000B,

    /// Bypass and pre-heater valves.
    ValveStatus = 0x000D,

    /// Five temperature channels.
    TemperatureStatus = 0x00D1,

    /// Running-hour counters.
    OperatingTime = 0x00DD,

    /// Select fan speed (1-byte payload, 1..=4).
    SetFanSpeed = 0x0099,
}

impl Command {
    /// Two-byte opcode as sent on the wire.
    pub fn opcode(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }

    pub fn from_opcode(opcode: [u8; 2]) -> Option<Self> {
        match u16::from_be_bytes(opcode) {
            0x0069 => Some(Command::DeviceInfo),
            0x000B => Some(Command::FanStatus),
            0x000D => Some(Command::ValveStatus),
            0x00D1 => Some(Command::TemperatureStatus),
            0x00DD => Some(Command::OperatingTime),
            0x0099 => Some(Command::SetFanSpeed),
            _ => None,
        }
    }

    /// Opcode the unit echoes in its reply.
    pub fn response_opcode(self) -> [u8; 2] {
        response_opcode(self.opcode())
    }
}

/// Reply opcode for a request opcode: high byte `0x00`, low byte + 1.
pub fn response_opcode(request: [u8; 2]) -> [u8; 2] {
    [0x00, request[1].wrapping_add(1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_are_big_endian() {
        assert_eq!(Command::DeviceInfo.opcode(), [0x00, 0x69]);
        assert_eq!(Command::TemperatureStatus.opcode(), [0x00, 0xD1]);
        assert_eq!(Command::from_opcode([0x00, 0x99]), Some(Command::SetFanSpeed));
        assert_eq!(Command::from_opcode([0x00, 0x00]), None);
    }

    #[test]
    fn reply_opcode_increments_low_byte() {
        assert_eq!(Command::FanStatus.response_opcode(), [0x00, 0x0C]);
        assert_eq!(Command::OperatingTime.response_opcode(), [0x00, 0xDE]);
        assert_eq!(response_opcode([0x12, 0xFF]), [0x00, 0x00]);
    }
}
