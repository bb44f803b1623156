//! The node: PUB socket, peer bootstrap, and one channel task per peer.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use wiki_crypto::{secret_to_public, PUBLIC_LEN, SECRET_LEN};
use wiki_message::Message;
use wiki_repository::Repository;
use zeromq::{PubSocket, Socket, SocketSend, ZmqMessage};

use crate::channel::Channel;
use crate::keyring::Keyring;
use crate::seed::{self, SeedsFile};
use crate::sync::SyncSession;
use crate::ProtocolError;

/// Display tag for a peer: the first four bytes of SHA-256 over its public
/// key, read little-endian. Logging only.
pub fn node_id(public_key: &[u8]) -> u32 {
    let digest = wiki_hash::hash_body(public_key);
    let bytes = digest.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// A running synchronization node.
///
/// Binds one PUB socket on the listen port; all channels broadcast through
/// it, each frame encrypted for exactly one recipient. Runs on a
/// single-threaded runtime; spawn via `tokio::task::LocalSet`.
pub struct Node {
    repo: Rc<Repository>,
    port: u16,
    secret: [u8; SECRET_LEN],
    public: [u8; PUBLIC_LEN],
}

impl Node {
    pub fn new(repo: Repository, port: u16, secret: [u8; SECRET_LEN]) -> Self {
        let public = secret_to_public(&secret);
        Self {
            repo: Rc::new(repo),
            port,
            secret,
            public,
        }
    }

    /// Bootstrap from the seed service and run until every channel ends.
    pub async fn run(self) -> Result<(), ProtocolError> {
        let peers = self.bootstrap().await?;
        tracing::info!(
            id = node_id(&self.public),
            port = self.port,
            peers = peers.len(),
            "node starting"
        );

        let mut publisher = PubSocket::new();
        publisher.bind(&format!("tcp://0.0.0.0:{}", self.port)).await?;

        let (outbound, mut queue) = mpsc::unbounded_channel::<Vec<u8>>();
        let writer = tokio::task::spawn_local(async move {
            while let Some(ciphertext) = queue.recv().await {
                if let Err(e) = publisher.send(ZmqMessage::from(ciphertext)).await {
                    tracing::error!(error = %e, "publish failed");
                }
            }
        });

        for (address, peer_public) in peers {
            let repo = Rc::clone(&self.repo);
            let secret = self.secret;
            let outbound = outbound.clone();
            tokio::task::spawn_local(async move {
                // A failed channel takes down only itself.
                if let Err(e) = run_channel(repo, secret, peer_public, &address, outbound).await
                {
                    tracing::error!(peer = %address, error = %e, "channel failed");
                }
            });
        }
        drop(outbound);

        // The writer drains until the last channel hangs up.
        let _ = writer.await;
        Ok(())
    }

    /// Merge the seed service's peer map with the persistent seeds file
    /// (file entries win), drop ourselves, persist the result, and keep
    /// only keyring-authorized peers.
    async fn bootstrap(&self) -> Result<HashMap<String, [u8; PUBLIC_LEN]>, ProtocolError> {
        let our_address = format!("127.0.0.1:{}", self.port);
        let mut merged = seed::fetch_peers(&our_address, &self.public).await?;

        let seeds_file = SeedsFile::open(self.repo.dot_path());
        merged.extend(seeds_file.load()?);
        merged.remove(&our_address);
        seeds_file.save(&merged)?;

        let authorized = Keyring::open(self.repo.dot_path()).authorized_keys()?;
        merged.retain(|address, key| {
            if *key == self.public {
                return false;
            }
            let keep = authorized.contains(key);
            if !keep {
                tracing::debug!(peer = %address, "peer not in keyring, skipping");
            }
            keep
        });
        Ok(merged)
    }
}

/// One channel's lifetime: connect, settle, handshake, then serve the
/// session until the transport fails.
async fn run_channel(
    repo: Rc<Repository>,
    secret: [u8; SECRET_LEN],
    peer_public: [u8; PUBLIC_LEN],
    address: &str,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
) -> Result<(), ProtocolError> {
    let mut channel = Channel::open(address, secret, peer_public, outbound).await?;

    // Give the SUB subscription time to propagate before the first send.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let mut session = SyncSession::new(&repo, &peer_public);
    tracing::info!(peer = %address, id = node_id(&peer_public), "connect");

    for message in session.connect() {
        channel.send_message(&message)?;
    }

    loop {
        let plaintext = channel.receive().await?;
        // Malformed frames are dropped without a word to the peer.
        let Some(message) = Message::decode(&plaintext) else {
            continue;
        };
        tracing::debug!(command = message.command(), id = node_id(&peer_public), "got");
        for reply in session.handle(&message)? {
            channel.send_message(&reply)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_stable() {
        let key = [5u8; 32];
        assert_eq!(node_id(&key), node_id(&key));
        assert_ne!(node_id(&[5u8; 32]), node_id(&[6u8; 32]));
    }

    #[test]
    fn node_id_reads_digest_little_endian() {
        let key = [5u8; 32];
        let digest = wiki_hash::hash_body(&key);
        let b = digest.as_bytes();
        let expected = (b[0] as u32)
            | ((b[1] as u32) << 8)
            | ((b[2] as u32) << 16)
            | ((b[3] as u32) << 24);
        assert_eq!(node_id(&key), expected);
    }
}
