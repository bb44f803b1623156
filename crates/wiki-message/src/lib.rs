//! Wire codec and typed protocol messages.
//!
//! Frames carry a checksummed header and one of four commands. Decoding is
//! total: every malformed input collapses to `None`, so the network layer
//! can drop bad frames without ever propagating an error to the peer.

mod codec;
mod frame;
mod message;

pub use codec::{DeserialError, Deserializer, Serializer};
pub use frame::{FrameHeader, COMMAND_LEN, MAGIC, VERSION};
pub use message::Message;
