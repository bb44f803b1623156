//! Authenticated public-key encryption between peers.
//!
//! A fixed NaCl-box construction: X25519 key agreement with
//! XSalsa20-Poly1305. A ciphertext produced for `(sender secret, receiver
//! public)` decrypts only under `(sender public, receiver secret)` and
//! authenticates the sender. Ciphertext layout is the 24-byte random nonce
//! followed by the box output, so ciphertexts interoperate across
//! implementations of the same construction.

use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey};

/// Length of a secret key in bytes.
pub const SECRET_LEN: usize = 32;

/// Length of a public key in bytes.
pub const PUBLIC_LEN: usize = 32;

/// Length of the nonce prefixed to every ciphertext.
pub const NONCE_LEN: usize = 24;

/// Errors produced by the encryption path.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encrypt,
}

/// Generate a fresh random secret key.
pub fn random_secret() -> [u8; SECRET_LEN] {
    SecretKey::generate(&mut OsRng).to_bytes()
}

/// Derive the public key matching a secret.
pub fn secret_to_public(secret: &[u8; SECRET_LEN]) -> [u8; PUBLIC_LEN] {
    *SecretKey::from(*secret).public_key().as_bytes()
}

/// Encrypt and authenticate a message from a sender to a receiver.
///
/// Returns `nonce || box ciphertext`.
pub fn encrypt_sign(
    message: &[u8],
    sender_secret: &[u8; SECRET_LEN],
    receiver_public: &[u8; PUBLIC_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let sender = SecretKey::from(*sender_secret);
    let receiver = PublicKey::from(*receiver_public);
    let salsa_box = SalsaBox::new(&receiver, &sender);

    let nonce = SalsaBox::generate_nonce(&mut OsRng);
    let ciphertext = salsa_box
        .encrypt(&nonce, message)
        .map_err(|_| CryptoError::Encrypt)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypt and verify a ciphertext from a sender.
///
/// `None` on truncated input or authentication failure; the caller treats
/// such frames as not addressed to it.
pub fn decrypt_verify(
    cipher: &[u8],
    sender_public: &[u8; PUBLIC_LEN],
    receiver_secret: &[u8; SECRET_LEN],
) -> Option<Vec<u8>> {
    if cipher.len() < NONCE_LEN {
        return None;
    }
    let (nonce, ciphertext) = cipher.split_at(NONCE_LEN);
    let nonce = crypto_box::aead::generic_array::GenericArray::from_slice(nonce);

    let receiver = SecretKey::from(*receiver_secret);
    let sender = PublicKey::from(*sender_public);
    let salsa_box = SalsaBox::new(&sender, &receiver);

    salsa_box.decrypt(nonce, ciphertext).ok()
}
