//! Seed service client and the persistent seeds file.
//!
//! The seed service is an external request/reply endpoint: a node
//! advertises its own address and public key and receives the full
//! `address → public key` map of known peers. The merged map is persisted
//! to the `seeds` file between runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use wiki_crypto::PUBLIC_LEN;
use wiki_hash::hex::{hex_to_bytes, hex_to_string};
use wiki_message::{Deserializer, Serializer};
use zeromq::{Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::ProtocolError;

/// Endpoint of the seed service.
pub const SEED_ENDPOINT: &str = "tcp://127.0.0.1:5577";

/// The persisted `address → public key` peer map.
///
/// Stored as a JSON object with hex-encoded keys; the wire contract only
/// requires the file to round-trip through this node.
pub struct SeedsFile {
    path: PathBuf,
}

impl SeedsFile {
    pub fn open(dot_path: impl AsRef<Path>) -> Self {
        Self {
            path: dot_path.as_ref().join("seeds"),
        }
    }

    /// Load the persisted map. A missing file is an empty map.
    pub fn load(&self) -> Result<HashMap<String, [u8; PUBLIC_LEN]>, ProtocolError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(ProtocolError::Io(e)),
        };
        let raw: HashMap<String, String> = serde_json::from_str(&text)?;
        let mut map = HashMap::new();
        for (address, hex) in raw {
            let bytes = hex_to_bytes(&hex).map_err(|_| ProtocolError::BadSeedReply)?;
            if bytes.len() != PUBLIC_LEN {
                return Err(ProtocolError::BadSeedReply);
            }
            let mut key = [0u8; PUBLIC_LEN];
            key.copy_from_slice(&bytes);
            map.insert(address, key);
        }
        Ok(map)
    }

    /// Persist the map, replacing the previous contents.
    pub fn save(&self, map: &HashMap<String, [u8; PUBLIC_LEN]>) -> Result<(), ProtocolError> {
        let raw: HashMap<&str, String> = map
            .iter()
            .map(|(address, key)| (address.as_str(), hex_to_string(key)))
            .collect();
        fs::write(&self.path, serde_json::to_string(&raw)?)?;
        Ok(())
    }
}

/// Announce ourselves to the seed service and fetch the current peer map.
///
/// Request: `string address || data public_key`.
/// Reply: `u16 N || N × (string address, data public_key)`.
pub async fn fetch_peers(
    our_address: &str,
    public_key: &[u8; PUBLIC_LEN],
) -> Result<HashMap<String, [u8; PUBLIC_LEN]>, ProtocolError> {
    let mut socket = zeromq::ReqSocket::new();
    socket.connect(SEED_ENDPOINT).await?;

    let mut serial = Serializer::new();
    serial.write_string(our_address);
    serial.write_data(public_key);
    socket.send(ZmqMessage::from(serial.finish())).await?;

    let reply = socket.recv().await?;
    let data = reply.get(0).ok_or(ProtocolError::BadSeedReply)?;
    parse_seed_reply(data)
}

fn parse_seed_reply(data: &[u8]) -> Result<HashMap<String, [u8; PUBLIC_LEN]>, ProtocolError> {
    let mut deserial = Deserializer::new(data);
    let count = deserial.read_u16().map_err(|_| ProtocolError::BadSeedReply)?;
    let mut map = HashMap::new();
    for _ in 0..count {
        let address = deserial
            .read_string()
            .map_err(|_| ProtocolError::BadSeedReply)?;
        let key = deserial
            .read_data()
            .map_err(|_| ProtocolError::BadSeedReply)?;
        if key.len() != PUBLIC_LEN {
            return Err(ProtocolError::BadSeedReply);
        }
        let mut public = [0u8; PUBLIC_LEN];
        public.copy_from_slice(&key);
        map.insert(address, public);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn seeds_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let seeds = SeedsFile::open(dir.path());

        let mut map = HashMap::new();
        map.insert("127.0.0.1:9001".to_string(), [7u8; 32]);
        map.insert("127.0.0.1:9002".to_string(), [9u8; 32]);
        seeds.save(&map).unwrap();

        assert_eq!(seeds.load().unwrap(), map);
    }

    #[test]
    fn missing_seeds_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let seeds = SeedsFile::open(dir.path());
        assert!(seeds.load().unwrap().is_empty());
    }

    #[test]
    fn parse_reply() {
        let mut serial = Serializer::new();
        serial.write_u16(2);
        serial.write_string("127.0.0.1:9001");
        serial.write_data(&[1u8; 32]);
        serial.write_string("127.0.0.1:9002");
        serial.write_data(&[2u8; 32]);

        let map = parse_seed_reply(&serial.finish()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["127.0.0.1:9001"], [1u8; 32]);
        assert_eq!(map["127.0.0.1:9002"], [2u8; 32]);
    }

    #[test]
    fn truncated_reply_rejected() {
        let mut serial = Serializer::new();
        serial.write_u16(3);
        serial.write_string("127.0.0.1:9001");
        serial.write_data(&[1u8; 32]);
        assert!(matches!(
            parse_seed_reply(&serial.finish()).unwrap_err(),
            ProtocolError::BadSeedReply
        ));
    }

    #[test]
    fn wrong_key_length_rejected() {
        let mut serial = Serializer::new();
        serial.write_u16(1);
        serial.write_string("127.0.0.1:9001");
        serial.write_data(&[1u8; 16]);
        assert!(matches!(
            parse_seed_reply(&serial.finish()).unwrap_err(),
            ProtocolError::BadSeedReply
        ));
    }
}
