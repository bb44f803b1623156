use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use wiki_crypto::PUBLIC_LEN;
use wiki_hash::hex::{hex_to_bytes, hex_to_string};

use crate::ProtocolError;

/// The set of peer public keys this node will talk to.
///
/// One lowercase hex key per line. A peer absent from the keyring is not
/// authenticated and gets no channel.
pub struct Keyring {
    path: PathBuf,
}

impl Keyring {
    pub fn open(dot_path: impl AsRef<Path>) -> Self {
        Self {
            path: dot_path.as_ref().join("keyring"),
        }
    }

    /// Authorize a public key. Re-adding an existing key is a no-op.
    pub fn add_public_key(&self, public_key: &[u8; PUBLIC_LEN]) -> Result<(), ProtocolError> {
        let mut keys = self.authorized_keys()?;
        keys.insert(*public_key);
        let mut out = String::new();
        let mut lines: Vec<String> = keys.iter().map(|k| hex_to_string(k)).collect();
        lines.sort();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }

    /// All authorized keys. A missing keyring file is an empty set.
    pub fn authorized_keys(&self) -> Result<HashSet<[u8; PUBLIC_LEN]>, ProtocolError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(ProtocolError::Io(e)),
        };
        let mut keys = HashSet::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Ok(bytes) = hex_to_bytes(line) {
                if bytes.len() == PUBLIC_LEN {
                    let mut key = [0u8; PUBLIC_LEN];
                    key.copy_from_slice(&bytes);
                    keys.insert(key);
                }
            }
        }
        Ok(keys)
    }

    /// Whether a key is authorized.
    pub fn is_authorized(&self, public_key: &[u8; PUBLIC_LEN]) -> Result<bool, ProtocolError> {
        Ok(self.authorized_keys()?.contains(public_key))
    }
}
