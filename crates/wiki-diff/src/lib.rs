//! Character diff, three-way merge, and file-set comparison.
//!
//! Diffs are tagged run sequences `(sign, text)`: `-1` text only in the old
//! version, `0` text in both, `+1` text only in the new version. Filtering a
//! run list to `{0,-1}` reproduces the old text exactly; `{0,+1}` the new.

pub mod algorithm;
pub mod color;
mod engine;
mod threeway;

pub use engine::{CommitSource, DifferenceEngine, FileSource, IndexSource, WorktreeSource};
pub use threeway::three_way_merge;

pub use error::DiffError;

mod error {
    #[derive(Debug, thiserror::Error)]
    pub enum DiffError {
        #[error("no commit found to diff against")]
        NoCommit,

        #[error("blob {0} is not UTF-8 text")]
        NotText(wiki_hash::Ident),

        #[error(transparent)]
        Odb(#[from] wiki_odb::OdbError),

        #[error(transparent)]
        Index(#[from] wiki_index::IndexError),

        #[error(transparent)]
        Repo(#[from] wiki_repository::RepoError),

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}

/// Which side of a diff a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    /// Present only in the old text.
    Delete,
    /// Present in both texts.
    Equal,
    /// Present only in the new text.
    Insert,
}

impl Sign {
    /// The conventional numeric tag: -1, 0, +1.
    pub fn value(&self) -> i8 {
        match self {
            Sign::Delete => -1,
            Sign::Equal => 0,
            Sign::Insert => 1,
        }
    }
}

/// One tagged run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRun {
    pub sign: Sign,
    pub text: String,
}

impl DiffRun {
    pub fn new(sign: Sign, text: impl Into<String>) -> Self {
        Self {
            sign,
            text: text.into(),
        }
    }
}

/// Reconstruct the old text: concatenation of `{0,-1}` runs.
pub fn old_text(runs: &[DiffRun]) -> String {
    runs.iter()
        .filter(|r| r.sign != Sign::Insert)
        .map(|r| r.text.as_str())
        .collect()
}

/// Reconstruct the new text: concatenation of `{0,+1}` runs.
pub fn new_text(runs: &[DiffRun]) -> String {
    runs.iter()
        .filter(|r| r.sign != Sign::Delete)
        .map(|r| r.text.as_str())
        .collect()
}
