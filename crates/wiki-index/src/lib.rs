//! Staging index and directory-tree assembly.
//!
//! The index is the staged-file list proposed for the next commit: one
//! `"<mode> <hexident> <path>\n"` line per file, insertion-ordered, at most
//! one entry per path. `write_tree` assembles the index into tree objects;
//! `tree_files` flattens a stored tree back into per-file records.

mod dirtree;
mod file;
mod write_tree;

pub use dirtree::{BlobEntry, DirectoryTree, NodeIndex};
pub use file::IndexFile;
pub use write_tree::{tree_files, write_tree};

use wiki_hash::Ident;

pub use error::IndexError;

mod error {
    #[derive(Debug, thiserror::Error)]
    pub enum IndexError {
        #[error("invalid index entry on line {line}: {reason}")]
        InvalidEntry { line: usize, reason: String },

        #[error(transparent)]
        Io(#[from] std::io::Error),

        #[error(transparent)]
        Odb(#[from] wiki_odb::OdbError),
    }
}

/// One staged file: mode, blob identifier, repo-relative path.
///
/// Paths use `/` as separator regardless of platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub mode: String,
    pub ident: Ident,
    pub path: String,
}

impl IndexEntry {
    pub fn new(mode: impl Into<String>, ident: Ident, path: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            ident,
            path: path.into(),
        }
    }
}
