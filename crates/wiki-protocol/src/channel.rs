//! Per-peer encrypted channel.
//!
//! A channel owns one SUB stream and the peer's public key. Everything it
//! receives is tried against `(peer public, node secret)`; frames that fail
//! authenticated decryption are someone else's traffic and are skipped.
//! Outbound frames are encrypted per-recipient and enqueued on the node's
//! shared PUB socket.

use tokio::sync::mpsc;
use wiki_crypto::{decrypt_verify, encrypt_sign, PUBLIC_LEN, SECRET_LEN};
use wiki_message::Message;
use zeromq::{Socket, SocketRecv, SubSocket};

use crate::ProtocolError;

pub struct Channel {
    sub: SubSocket,
    secret: [u8; SECRET_LEN],
    peer_public: [u8; PUBLIC_LEN],
    outbound: mpsc::UnboundedSender<Vec<u8>>,
}

impl Channel {
    /// Connect the SUB stream to a peer address and subscribe to everything.
    pub async fn open(
        address: &str,
        secret: [u8; SECRET_LEN],
        peer_public: [u8; PUBLIC_LEN],
        outbound: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Result<Self, ProtocolError> {
        let mut sub = SubSocket::new();
        sub.connect(&format!("tcp://{address}")).await?;
        sub.subscribe("").await?;
        Ok(Self {
            sub,
            secret,
            peer_public,
            outbound,
        })
    }

    /// Next plaintext addressed to us. Frames for other recipients (or
    /// garbage) fail decryption and are skipped.
    pub async fn receive(&mut self) -> Result<Vec<u8>, ProtocolError> {
        loop {
            let message = self.sub.recv().await?;
            let Some(frame) = message.get(0) else {
                continue;
            };
            if let Some(plaintext) = decrypt_verify(frame, &self.peer_public, &self.secret) {
                return Ok(plaintext);
            }
        }
    }

    /// Encrypt a frame for this peer and enqueue it for broadcast.
    pub fn send(&self, plaintext: &[u8]) -> Result<(), ProtocolError> {
        let ciphertext = encrypt_sign(plaintext, &self.secret, &self.peer_public)?;
        self.outbound
            .send(ciphertext)
            .map_err(|_| ProtocolError::QueueClosed)
    }

    /// Encode and send a protocol message.
    pub fn send_message(&self, message: &Message) -> Result<(), ProtocolError> {
        self.send(&message.encode())
    }
}
