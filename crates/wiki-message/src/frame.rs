//! Checksummed frame header.
//!
//! ```text
//! magic:    u16 = 1337
//! version:  u16 = 1
//! command:  12 bytes, ASCII, NUL-padded
//! payload:  u16 length + bytes
//! checksum: u32 = first 4 bytes of SHA-256 of the above, little-endian
//! ```

use sha2::{Digest, Sha256};

use crate::codec::{Deserializer, Serializer};

/// Frame magic value.
pub const MAGIC: u16 = 1337;

/// Protocol version.
pub const VERSION: u16 = 1;

/// Width of the NUL-padded command field.
pub const COMMAND_LEN: usize = 12;

/// A framed command with payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub command: String,
    pub payload: Vec<u8>,
}

impl FrameHeader {
    pub fn new(command: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            command: command.into(),
            payload,
        }
    }

    fn encode_without_checksum(&self) -> Vec<u8> {
        let mut serial = Serializer::new();
        serial.write_u16(MAGIC);
        serial.write_u16(VERSION);
        serial.write_fixed_string(&self.command, COMMAND_LEN);
        serial.write_data(&self.payload);
        serial.finish()
    }

    fn checksum(prefix: &[u8]) -> u32 {
        let digest = Sha256::digest(prefix);
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Encode the frame, checksum last.
    pub fn encode(&self) -> Vec<u8> {
        let mut serial = Serializer::new();
        let prefix = self.encode_without_checksum();
        serial.append(&prefix);
        serial.write_u32(Self::checksum(&prefix));
        serial.finish()
    }

    /// Decode a frame.
    ///
    /// `None` on a short buffer, wrong magic or version, or checksum
    /// mismatch; the caller drops such frames silently.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let mut deserial = Deserializer::new(data);
        let magic = deserial.read_u16().ok()?;
        let version = deserial.read_u16().ok()?;
        let command = deserial.read_fixed_string(COMMAND_LEN).ok()?;
        let payload = deserial.read_data().ok()?;
        let checksum = deserial.read_u32().ok()?;

        if magic != MAGIC || version != VERSION {
            return None;
        }
        let frame = Self { command, payload };
        if Self::checksum(&frame.encode_without_checksum()) != checksum {
            return None;
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let frame = FrameHeader::new("hello", Vec::new());
        let decoded = FrameHeader::decode(&frame.encode()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn roundtrip_with_payload() {
        let frame = FrameHeader::new("sync", b"some payload bytes".to_vec());
        let decoded = FrameHeader::decode(&frame.encode()).unwrap();
        assert_eq!(decoded.command, "sync");
        assert_eq!(decoded.payload, b"some payload bytes");
    }

    #[test]
    fn layout_is_fixed() {
        let frame = FrameHeader::new("hello", Vec::new());
        let data = frame.encode();
        // magic 1337 big-endian, version 1.
        assert_eq!(&data[..4], &[0x05, 0x39, 0x00, 0x01]);
        // 12 command bytes, then a zero-length payload field.
        assert_eq!(&data[4..9], b"hello");
        assert!(data[9..16].iter().all(|&b| b == 0));
        assert_eq!(&data[16..18], &[0, 0]);
        assert_eq!(data.len(), 22);
    }

    #[test]
    fn wrong_magic_rejected() {
        let mut data = FrameHeader::new("hello", Vec::new()).encode();
        data[0] = 0xff;
        assert_eq!(FrameHeader::decode(&data), None);
    }

    #[test]
    fn wrong_version_rejected() {
        let mut data = FrameHeader::new("hello", Vec::new()).encode();
        data[3] = 9;
        assert_eq!(FrameHeader::decode(&data), None);
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let mut data = FrameHeader::new("sync", b"payload".to_vec()).encode();
        let mid = data.len() - 6;
        data[mid] ^= 0x40;
        assert_eq!(FrameHeader::decode(&data), None);
    }

    #[test]
    fn truncated_frame_rejected() {
        let data = FrameHeader::new("fetch", vec![0u8; 32]).encode();
        assert_eq!(FrameHeader::decode(&data[..data.len() - 1]), None);
    }
}
