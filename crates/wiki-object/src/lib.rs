//! Object model for the darkwiki engine: blob, tree, commit parsing and
//! serialization.
//!
//! Objects are stored as `"<KIND>:" || body`. The header is storage framing
//! only; an object's identifier is the SHA-256 of the body alone.

mod commit;
pub mod mode;
mod tree;

pub use commit::CommitRecord;
pub use tree::TreeEntry;

use wiki_hash::{HashError, Ident};

/// Errors produced by object operations.
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("invalid object kind: {0}")]
    InvalidKind(String),

    #[error("invalid object header")]
    InvalidHeader,

    #[error("invalid tree entry on line {line}: {reason}")]
    InvalidTreeEntry { line: usize, reason: String },

    #[error("invalid commit body: {0}")]
    InvalidCommit(#[from] serde_json::Error),

    #[error("object body is not UTF-8")]
    NotUtf8,

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// The three kinds of darkwiki objects.
///
/// The numeric values are part of the wire format (`object` message body).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob = 1,
    Tree = 2,
    Commit = 3,
}

impl ObjectKind {
    /// Parse from the canonical uppercase name used in storage headers and
    /// tree entry lines.
    pub fn from_name(s: &str) -> Result<Self, ObjectError> {
        match s {
            "BLOB" => Ok(Self::Blob),
            "TREE" => Ok(Self::Tree),
            "COMMIT" => Ok(Self::Commit),
            _ => Err(ObjectError::InvalidKind(s.to_string())),
        }
    }

    /// The canonical uppercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Blob => "BLOB",
            Self::Tree => "TREE",
            Self::Commit => "COMMIT",
        }
    }

    /// Parse from the one-byte wire value.
    pub fn from_wire(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Blob),
            2 => Some(Self::Tree),
            3 => Some(Self::Commit),
            _ => None,
        }
    }

    /// The one-byte wire value.
    pub fn wire_value(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = ObjectError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// A parsed darkwiki object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Vec<TreeEntry>),
    Commit(CommitRecord),
}

impl Object {
    /// Parse from stored bytes (`"<KIND>:" || body`).
    pub fn parse(data: &[u8]) -> Result<Self, ObjectError> {
        let colon = data
            .iter()
            .position(|&b| b == b':')
            .ok_or(ObjectError::InvalidHeader)?;
        let name = std::str::from_utf8(&data[..colon]).map_err(|_| ObjectError::InvalidHeader)?;
        let kind = ObjectKind::from_name(name)?;
        Self::parse_body(kind, &data[colon + 1..])
    }

    /// Parse a body with known kind (no header).
    pub fn parse_body(kind: ObjectKind, body: &[u8]) -> Result<Self, ObjectError> {
        match kind {
            ObjectKind::Blob => Ok(Self::Blob(body.to_vec())),
            ObjectKind::Tree => Ok(Self::Tree(tree::parse_tree(body)?)),
            ObjectKind::Commit => Ok(Self::Commit(serde_json::from_slice(body)?)),
        }
    }

    /// Serialize to storage format (header + body).
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let mut out = Vec::with_capacity(self.kind().name().len() + 1 + body.len());
        out.extend_from_slice(self.kind().name().as_bytes());
        out.push(b':');
        out.extend_from_slice(&body);
        out
    }

    /// Serialize just the body, the bytes the identifier hashes.
    pub fn serialize_body(&self) -> Vec<u8> {
        match self {
            Self::Blob(data) => data.clone(),
            Self::Tree(entries) => tree::serialize_tree(entries),
            Self::Commit(record) => serde_json::to_vec(record)
                .expect("commit record serialization is infallible"),
        }
    }

    /// The object kind.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Compute the identifier by hashing the body.
    pub fn ident(&self) -> Ident {
        wiki_hash::hash_body(&self.serialize_body())
    }
}
