//! Peer synchronization: pub/sub transport wiring, per-peer encrypted
//! channels, and the object gossip state machine.
//!
//! The session logic ([`SyncSession`]) is pure with respect to sockets: it
//! consumes decoded messages and returns the messages to send, so the whole
//! protocol is testable without a transport. [`Node`] and [`Channel`] wire
//! sessions to ZeroMQ PUB/SUB sockets on a single-threaded runtime.

mod channel;
mod keyring;
mod node;
mod seed;
mod sync;

pub use channel::Channel;
pub use keyring::Keyring;
pub use node::{node_id, Node};
pub use seed::SeedsFile;
pub use sync::SyncSession;

pub use error::ProtocolError;

mod error {
    #[derive(Debug, thiserror::Error)]
    pub enum ProtocolError {
        #[error("malformed seed service reply")]
        BadSeedReply,

        #[error(transparent)]
        Crypto(#[from] wiki_crypto::CryptoError),

        #[error(transparent)]
        Odb(#[from] wiki_odb::OdbError),

        #[error(transparent)]
        Ref(#[from] wiki_ref::RefError),

        #[error(transparent)]
        Repo(#[from] wiki_repository::RepoError),

        #[error(transparent)]
        Merge(#[from] wiki_merge::MergeError),

        #[error("transport error: {0}")]
        Zmq(#[from] zeromq::ZmqError),

        #[error("outbound queue closed")]
        QueueClosed,

        #[error(transparent)]
        Json(#[from] serde_json::Error),

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}
