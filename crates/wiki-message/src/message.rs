//! The closed set of protocol messages.
//!
//! Dispatch is an explicit match on the frame's command field; an unknown
//! command, like any other malformed frame, decodes to `None`.

use wiki_hash::Ident;
use wiki_object::{CommitRecord, Object, ObjectKind, TreeEntry};

use crate::codec::{DeserialError, Deserializer, Serializer};
use crate::frame::FrameHeader;

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Session opener; also re-triggers a sync round.
    Hello,
    /// The sender's local branch tips.
    Sync { tips: Vec<(String, Ident)> },
    /// Request for one object.
    Fetch { ident: Ident },
    /// One object with its identifier.
    Object { ident: Ident, object: Object },
}

impl Message {
    /// The wire command name.
    pub fn command(&self) -> &'static str {
        match self {
            Message::Hello => "hello",
            Message::Sync { .. } => "sync",
            Message::Fetch { .. } => "fetch",
            Message::Object { .. } => "object",
        }
    }

    /// Encode to a complete frame.
    ///
    /// # Panics
    ///
    /// Panics if the payload exceeds the u16 `data` field; check
    /// [`Message::oversized`] first for untrusted object sizes.
    pub fn encode(&self) -> Vec<u8> {
        FrameHeader::new(self.command(), self.payload()).encode()
    }

    /// Whether this message's payload is too large for the frame format.
    ///
    /// Only `object` messages can get here: the codec's `data` fields carry
    /// at most 64 KiB, which bounds blob and tree bodies on the wire.
    pub fn oversized(&self) -> bool {
        self.payload().len() > u16::MAX as usize
    }

    /// Decode from a complete frame. `None` for anything malformed.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let frame = FrameHeader::decode(data)?;
        let mut deserial = Deserializer::new(&frame.payload);
        match frame.command.as_str() {
            "hello" => Some(Message::Hello),
            "sync" => decode_sync(&mut deserial).ok(),
            "fetch" => decode_fetch(&frame.payload).ok(),
            "object" => decode_object(&mut deserial).ok(),
            _ => None,
        }
    }

    fn payload(&self) -> Vec<u8> {
        let mut serial = Serializer::new();
        match self {
            Message::Hello => {}
            Message::Sync { tips } => {
                serial.write_u32(tips.len() as u32);
                for (branch, ident) in tips {
                    serial.write_string(branch);
                    serial.write_data(ident.as_bytes());
                }
            }
            Message::Fetch { ident } => {
                // The fetch payload is the raw ident, not length-prefixed.
                serial.append(ident.as_bytes());
            }
            Message::Object { ident, object } => {
                serial.write_data(ident.as_bytes());
                serial.write_u8(object.kind().wire_value());
                encode_object_body(&mut serial, object);
            }
        }
        serial.finish()
    }
}

fn read_ident(deserial: &mut Deserializer<'_>) -> Result<Ident, DeserialError> {
    let bytes = deserial.read_data()?;
    Ident::from_bytes(&bytes).map_err(|_| DeserialError::ShortBuffer)
}

fn decode_sync(deserial: &mut Deserializer<'_>) -> Result<Message, DeserialError> {
    let count = deserial.read_u32()?;
    let mut tips = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let branch = deserial.read_string()?;
        let ident = read_ident(deserial)?;
        tips.push((branch, ident));
    }
    Ok(Message::Sync { tips })
}

fn decode_fetch(payload: &[u8]) -> Result<Message, DeserialError> {
    let ident = Ident::from_bytes(payload).map_err(|_| DeserialError::ShortBuffer)?;
    Ok(Message::Fetch { ident })
}

fn encode_object_body(serial: &mut Serializer, object: &Object) {
    match object {
        Object::Blob(data) => serial.write_data(data),
        Object::Tree(entries) => {
            serial.write_u32(entries.len() as u32);
            for entry in entries {
                serial.write_string(&entry.mode);
                serial.write_u8(entry.kind.wire_value());
                serial.write_data(entry.ident.as_bytes());
                serial.write_string(&entry.name);
            }
        }
        Object::Commit(record) => {
            serial.write_data(record.tree.as_bytes());
            serial.write_u32(record.timestamp as u32);
            serial.write_u32(record.utc_offset as u32);
            match &record.previous_commit {
                Some(previous) => serial.write_data(previous.as_bytes()),
                // An empty data field encodes the missing first-commit
                // parent.
                None => serial.write_data(&[]),
            }
        }
    }
}

fn decode_object(deserial: &mut Deserializer<'_>) -> Result<Message, DeserialError> {
    let ident = read_ident(deserial)?;
    let kind = ObjectKind::from_wire(deserial.read_u8()?).ok_or(DeserialError::ShortBuffer)?;
    let object = match kind {
        ObjectKind::Blob => Object::Blob(deserial.read_data()?),
        ObjectKind::Tree => {
            let count = deserial.read_u32()?;
            let mut entries = Vec::with_capacity(count.min(4096) as usize);
            for _ in 0..count {
                let mode = deserial.read_string()?;
                let kind = ObjectKind::from_wire(deserial.read_u8()?)
                    .filter(|k| *k != ObjectKind::Commit)
                    .ok_or(DeserialError::ShortBuffer)?;
                let entry_ident = read_ident(deserial)?;
                let name = deserial.read_string()?;
                entries.push(TreeEntry::new(mode, kind, entry_ident, name));
            }
            Object::Tree(entries)
        }
        ObjectKind::Commit => {
            let tree = read_ident(deserial)?;
            let timestamp = deserial.read_u32()? as i64;
            let utc_offset = deserial.read_u32()? as i32;
            let previous = deserial.read_data()?;
            let previous_commit = if previous.is_empty() {
                None
            } else {
                Some(Ident::from_bytes(&previous).map_err(|_| DeserialError::ShortBuffer)?)
            };
            Object::Commit(CommitRecord {
                tree,
                timestamp,
                utc_offset,
                previous_commit,
            })
        }
    };
    Ok(Message::Object { ident, object })
}
