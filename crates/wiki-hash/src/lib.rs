//! Object identity for the darkwiki engine.
//!
//! This crate provides the core `Ident` type (a 32-byte SHA-256 digest),
//! hex encoding/decoding, and body hashing used throughout the workspace.

mod error;
pub mod hex;
mod ident;

pub use error::HashError;
pub use ident::Ident;

use sha2::{Digest, Sha256};

/// Hash an object body into its identifier.
///
/// Only the body is hashed; the `"KIND:"` storage header is framing, not
/// content. This must stay byte-exact for cross-implementation
/// reproducibility.
pub fn hash_body(body: &[u8]) -> Ident {
    let digest = Sha256::digest(body);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    Ident::from_raw(bytes)
}
