//! Repository facade: discovery, initialization, and the operations that tie
//! the object store, index, refs, and working tree together.

mod checkout;
mod discover;
mod error;
mod missing;

pub use error::RepoError;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use wiki_hash::Ident;
use wiki_object::{mode, CommitRecord};
use wiki_index::{IndexEntry, IndexFile};
use wiki_odb::ObjectStore;
use wiki_ref::RefStore;

/// Name of the repository dot-directory.
pub const DOT_DIR: &str = ".darkwiki";

/// An opened darkwiki repository.
pub struct Repository {
    root: PathBuf,
    store: ObjectStore,
    refs: RefStore,
    index: IndexFile,
}

impl Repository {
    /// Open the repository whose root is `root` (must contain `.darkwiki`).
    pub fn open(root: impl AsRef<Path>) -> Result<Self, RepoError> {
        let root = root.as_ref().to_path_buf();
        let dot = root.join(DOT_DIR);
        if !dot.is_dir() {
            return Err(RepoError::NotARepository(root));
        }
        Ok(Self {
            store: ObjectStore::open(dot.join("objects")),
            refs: RefStore::open(&dot),
            index: IndexFile::open(dot.join("index")),
            root,
        })
    }

    /// Walk up from the current directory until `.darkwiki` is found.
    pub fn discover() -> Result<Self, RepoError> {
        let start = std::env::current_dir()?;
        Self::discover_from(&start)
    }

    /// Walk up from `start` until `.darkwiki` is found.
    pub fn discover_from(start: &Path) -> Result<Self, RepoError> {
        let root = discover::find_root(start)?;
        Self::open(root)
    }

    /// Initialize a new repository in `dir` and open it.
    pub fn init(dir: impl AsRef<Path>) -> Result<Self, RepoError> {
        let dir = dir.as_ref();
        let dot = dir.join(DOT_DIR);
        fs::create_dir(&dot)?;
        fs::create_dir(dot.join("objects"))?;
        fs::create_dir_all(dot.join("refs").join("heads"))?;
        let refs = RefStore::open(&dot);
        refs.set_head("refs/heads/master")?;
        let index = IndexFile::open(dot.join("index"));
        index.create()?;
        Self::open(dir)
    }

    /// Repository root (the directory containing `.darkwiki`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the dot-directory.
    pub fn dot_path(&self) -> PathBuf {
        self.root.join(DOT_DIR)
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn index(&self) -> &IndexFile {
        &self.index
    }

    // --- working tree ---

    /// Absolute path of a repo-relative file.
    pub fn work_path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Turn a user-supplied path into a repo-relative `/`-separated one.
    pub fn relative_path(&self, path: &Path) -> Result<String, RepoError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let rel = absolute
            .strip_prefix(&self.root)
            .map_err(|_| RepoError::OutsideRepository(absolute.clone()))?;
        let mut segments = Vec::new();
        for component in rel.components() {
            let segment = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| RepoError::NonUtf8Path(absolute.clone()))?;
            segments.push(segment);
        }
        Ok(segments.join("/"))
    }

    /// Read a working-tree file.
    pub fn read_work_file(&self, rel: &str) -> Result<Vec<u8>, RepoError> {
        Ok(fs::read(self.work_path(rel))?)
    }

    /// Write a working-tree file, creating parent directories.
    pub fn write_work_file(&self, rel: &str, data: &[u8]) -> Result<(), RepoError> {
        let path = self.work_path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Delete a working-tree file.
    pub fn remove_work_file(&self, rel: &str) -> Result<(), RepoError> {
        fs::remove_file(self.work_path(rel))?;
        Ok(())
    }

    /// SHA-256 of a working-tree file's bytes (equal to its blob ident).
    pub fn hash_file(&self, rel: &str) -> Result<Ident, RepoError> {
        Ok(wiki_hash::hash_body(&self.read_work_file(rel)?))
    }

    /// Store a file's contents as a blob and stage it.
    pub fn add_file(&self, rel: &str) -> Result<Ident, RepoError> {
        let data = self.read_work_file(rel)?;
        let ident = self.store.add_blob(&data)?;
        self.index.update(mode::BLOB, ident, rel)?;
        Ok(ident)
    }

    /// Re-stage every index entry whose on-disk contents changed.
    /// Returns the paths that were re-added.
    pub fn add_changed_files(&self) -> Result<Vec<String>, RepoError> {
        let mut changed = Vec::new();
        for entry in self.index.read()? {
            if self.hash_file(&entry.path)? != entry.ident {
                self.add_file(&entry.path)?;
                changed.push(entry.path);
            }
        }
        Ok(changed)
    }

    // --- trees and commits ---

    /// Assemble the current index into tree objects; returns the root ident.
    pub fn write_tree(&self) -> Result<Ident, RepoError> {
        let entries = self.index.read()?;
        Ok(wiki_index::write_tree(&self.store, &entries)?)
    }

    /// Write a commit and advance the current ref to it.
    ///
    /// `root_tree` defaults to write-tree over the current index; the branch
    /// merge passes the tree it assembled itself.
    pub fn commit(&self, root_tree: Option<Ident>) -> Result<Ident, RepoError> {
        let tree = match root_tree {
            Some(tree) => tree,
            None => self.write_tree()?,
        };
        let now = Local::now();
        let record = CommitRecord {
            tree,
            timestamp: now.timestamp(),
            utc_offset: now.offset().local_minus_utc(),
            previous_commit: self.refs.head_commit()?,
        };
        let ident = self.store.add_commit(&record)?;
        self.refs.write_ref(&ident)?;
        Ok(ident)
    }

    /// The root tree of a commit.
    pub fn commit_tree(&self, commit: &Ident) -> Result<Ident, RepoError> {
        Ok(self.store.fetch_commit(commit)?.tree)
    }

    /// Flat `(mode, ident, path)` listing of a commit's tree.
    pub fn commit_files(&self, commit: &Ident) -> Result<Vec<IndexEntry>, RepoError> {
        let tree = self.commit_tree(commit)?;
        Ok(wiki_index::tree_files(&self.store, &tree)?)
    }

    /// Commit chain from the current tip back to the first commit.
    pub fn log(&self) -> Result<Vec<(Ident, CommitRecord)>, RepoError> {
        let mut results = Vec::new();
        let mut cursor = self.refs.head_commit()?;
        while let Some(ident) = cursor {
            let record = self.store.fetch_commit(&ident)?;
            cursor = record.previous_commit;
            results.push((ident, record));
        }
        Ok(results)
    }

    /// Commit chain starting at an explicit tip.
    pub fn log_from(&self, tip: &Ident) -> Result<Vec<(Ident, CommitRecord)>, RepoError> {
        let mut results = Vec::new();
        let mut cursor = Some(*tip);
        while let Some(ident) = cursor {
            let record = self.store.fetch_commit(&ident)?;
            cursor = record.previous_commit;
            results.push((ident, record));
        }
        Ok(results)
    }

    /// `(branch, tip)` pairs for every local branch that has a commit.
    pub fn branches_tips(&self) -> Result<Vec<(String, Ident)>, RepoError> {
        let mut tips = Vec::new();
        for branch in self.refs.local_branches()? {
            if let Some(tip) = self.refs.branch_tip(&branch)? {
                tips.push((branch, tip));
            }
        }
        Ok(tips)
    }
}
