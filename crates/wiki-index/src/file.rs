use std::fs;
use std::path::{Path, PathBuf};

use wiki_hash::Ident;

use crate::{IndexEntry, IndexError};

/// The on-disk index file.
///
/// Every mutation rewrites the whole file; the format is small enough that
/// deterministic rewrites beat in-place editing.
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create an empty index file.
    pub fn create(&self) -> Result<(), IndexError> {
        fs::write(&self.path, b"")?;
        Ok(())
    }

    /// Read all entries, in file order.
    pub fn read(&self) -> Result<Vec<IndexEntry>, IndexError> {
        let text = fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            entries.push(parse_line(line, line_no + 1)?);
        }
        Ok(entries)
    }

    /// Rewrite the index with the given entries.
    pub fn write(&self, entries: &[IndexEntry]) -> Result<(), IndexError> {
        let mut out = String::new();
        for entry in entries {
            out.push_str(&entry.mode);
            out.push(' ');
            out.push_str(&entry.ident.to_hex());
            out.push(' ');
            out.push_str(&entry.path);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }

    /// Truncate the index.
    pub fn clear(&self) -> Result<(), IndexError> {
        self.create()
    }

    /// Stage an entry, replacing any existing entry for the same path.
    ///
    /// The replaced entry moves to the end of the file; write-tree output
    /// depends on this ordering, so it must stay deterministic.
    pub fn update(&self, mode: &str, ident: Ident, path: &str) -> Result<(), IndexError> {
        let mut entries = self.read()?;
        entries.retain(|e| e.path != path);
        entries.push(IndexEntry::new(mode, ident, path));
        self.write(&entries)
    }

    /// Remove the entry for a path, if present.
    pub fn remove(&self, path: &str) -> Result<(), IndexError> {
        let mut entries = self.read()?;
        entries.retain(|e| e.path != path);
        self.write(&entries)
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<IndexEntry, IndexError> {
    let mut fields = line.splitn(3, ' ');
    let (mode, ident, path) = match (fields.next(), fields.next(), fields.next()) {
        (Some(m), Some(i), Some(p)) if !p.is_empty() => (m, i, p),
        _ => {
            return Err(IndexError::InvalidEntry {
                line: line_no,
                reason: "expected 3 fields".to_string(),
            })
        }
    };
    let ident = Ident::from_hex(ident).map_err(|e| IndexError::InvalidEntry {
        line: line_no,
        reason: e.to_string(),
    })?;
    Ok(IndexEntry::new(mode, ident, path))
}
