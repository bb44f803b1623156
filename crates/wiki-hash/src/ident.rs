use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::HashError;

/// Number of bytes in an object identifier (SHA-256 digest).
pub const IDENT_LEN: usize = 32;

/// A darkwiki object identifier — the SHA-256 of an object's body.
///
/// Rendered externally as 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident([u8; IDENT_LEN]);

impl Ident {
    /// Wrap raw digest bytes.
    pub const fn from_raw(bytes: [u8; IDENT_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an Ident from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != IDENT_LEN {
            return Err(HashError::InvalidIdentLength {
                expected: IDENT_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; IDENT_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Create an Ident from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let mut bytes = [0u8; IDENT_LEN];
        hex_decode(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; IDENT_LEN] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.0)
    }

    /// Whether this ident's hex form starts with the given prefix.
    pub fn starts_with_hex(&self, prefix: &str) -> bool {
        self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({})", &self.to_hex()[..8])
    }
}

impl FromStr for Ident {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const HEX: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn from_hex_roundtrip() {
        let ident = Ident::from_hex(HEX).unwrap();
        assert_eq!(ident.to_hex(), HEX);
        let parsed: Ident = HEX.parse().unwrap();
        assert_eq!(parsed, ident);
    }

    #[test]
    fn from_bytes_roundtrip() {
        let ident = Ident::from_hex(HEX).unwrap();
        let again = Ident::from_bytes(ident.as_bytes()).unwrap();
        assert_eq!(ident, again);
    }

    #[test]
    fn from_bytes_wrong_length() {
        let err = Ident::from_bytes(&[0; 20]).unwrap_err();
        assert!(matches!(
            err,
            HashError::InvalidIdentLength { expected: 32, actual: 20 }
        ));
    }

    #[test]
    fn debug_shows_short_hash() {
        let ident = Ident::from_hex(HEX).unwrap();
        assert_eq!(format!("{:?}", ident), "Ident(e3b0c442)");
    }

    #[test]
    fn starts_with_hex_prefix() {
        let ident = Ident::from_hex(HEX).unwrap();
        assert!(ident.starts_with_hex("e3b0"));
        assert!(ident.starts_with_hex("E3B0"));
        assert!(!ident.starts_with_hex("abcd"));
    }

    #[test]
    fn hashmap_key() {
        let ident = Ident::from_hex(HEX).unwrap();
        let mut map = HashMap::new();
        map.insert(ident, "value");
        assert_eq!(map.get(&ident), Some(&"value"));
    }

    #[test]
    fn invalid_hex_rejected() {
        assert!(Ident::from_hex("abcd").is_err());
        assert!(Ident::from_hex(&"z".repeat(64)).is_err());
    }
}
