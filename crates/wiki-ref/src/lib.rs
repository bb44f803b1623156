//! HEAD and branch reference storage.
//!
//! `HEAD` holds `"ref: <refpath>"` naming the current branch. A ref file
//! under `refs/heads/<name>` (or `refs/remotes/<peer>/<name>`) holds the
//! branch tip's hex ident with no trailing newline; a branch exists iff its
//! ref file exists.

use std::fs;
use std::path::{Path, PathBuf};

use wiki_hash::{HashError, Ident};

/// Prefix of local branch refs.
pub const HEADS_PREFIX: &str = "refs/heads/";

/// Prefix of per-peer remote branch refs.
pub const REMOTES_PREFIX: &str = "refs/remotes/";

/// Errors produced by ref operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("malformed HEAD: {0:?}")]
    InvalidHead(String),

    #[error("HEAD does not name a local branch: {0}")]
    NotABranch(String),

    #[error("malformed ref {path}: {source}")]
    InvalidRef {
        path: String,
        source: HashError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reference store rooted at the repository dot-directory.
pub struct RefStore {
    dot_path: PathBuf,
}

impl RefStore {
    pub fn open(dot_path: impl AsRef<Path>) -> Self {
        Self {
            dot_path: dot_path.as_ref().to_path_buf(),
        }
    }

    fn head_path(&self) -> PathBuf {
        self.dot_path.join("HEAD")
    }

    fn ref_path(&self, refpath: &str) -> PathBuf {
        self.dot_path.join(refpath)
    }

    /// Point HEAD at a ref path (e.g. `refs/heads/master`).
    pub fn set_head(&self, refpath: &str) -> Result<(), RefError> {
        fs::write(self.head_path(), format!("ref: {refpath}"))?;
        Ok(())
    }

    /// The ref path HEAD names.
    pub fn current_ref(&self) -> Result<String, RefError> {
        let data = fs::read_to_string(self.head_path())?;
        let data = data.trim_end();
        match data.strip_prefix("ref: ") {
            Some(refpath) => Ok(refpath.to_string()),
            None => Err(RefError::InvalidHead(data.to_string())),
        }
    }

    /// The commit a ref points at, or `None` if the ref file is absent
    /// (first-commit case).
    pub fn ref_commit(&self, refpath: &str) -> Result<Option<Ident>, RefError> {
        let path = self.ref_path(refpath);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RefError::Io(e)),
        };
        let ident = Ident::from_hex(data.trim_end()).map_err(|source| RefError::InvalidRef {
            path: refpath.to_string(),
            source,
        })?;
        Ok(Some(ident))
    }

    /// Write an ident to an arbitrary ref path, creating parents.
    pub fn write_ref_path(&self, refpath: &str, ident: &Ident) -> Result<(), RefError> {
        let path = self.ref_path(refpath);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, ident.to_hex())?;
        Ok(())
    }

    /// Update the ref HEAD currently names.
    pub fn write_ref(&self, ident: &Ident) -> Result<(), RefError> {
        let refpath = self.current_ref()?;
        self.write_ref_path(&refpath, ident)
    }

    /// The tip of the current branch, if any commit exists yet.
    pub fn head_commit(&self) -> Result<Option<Ident>, RefError> {
        let refpath = self.current_ref()?;
        self.ref_commit(&refpath)
    }

    /// Names of all local branches.
    pub fn local_branches(&self) -> Result<Vec<String>, RefError> {
        self.list_dir(&self.dot_path.join("refs").join("heads"))
    }

    /// The basename of the current ref.
    pub fn active_branch(&self) -> Result<String, RefError> {
        let refpath = self.current_ref()?;
        match refpath.strip_prefix(HEADS_PREFIX) {
            Some(name) => Ok(name.to_string()),
            None => Err(RefError::NotABranch(refpath)),
        }
    }

    /// The tip commit of a local branch.
    pub fn branch_tip(&self, name: &str) -> Result<Option<Ident>, RefError> {
        self.ref_commit(&format!("{HEADS_PREFIX}{name}"))
    }

    /// Create or move a local branch to an ident.
    pub fn write_branch(&self, name: &str, ident: &Ident) -> Result<(), RefError> {
        self.write_ref_path(&format!("{HEADS_PREFIX}{name}"), ident)
    }

    /// Record a peer's branch tip under `refs/remotes/<peer_hex>/<branch>`.
    pub fn write_remote_ref(
        &self,
        peer_hex: &str,
        branch: &str,
        ident: &Ident,
    ) -> Result<(), RefError> {
        self.write_ref_path(&format!("{REMOTES_PREFIX}{peer_hex}/{branch}"), ident)
    }

    /// Branch names tracked for a peer.
    pub fn remote_branches(&self, peer_hex: &str) -> Result<Vec<String>, RefError> {
        self.list_dir(&self.dot_path.join("refs").join("remotes").join(peer_hex))
    }

    /// A peer's recorded tip for a branch.
    pub fn remote_tip(&self, peer_hex: &str, branch: &str) -> Result<Option<Ident>, RefError> {
        self.ref_commit(&format!("{REMOTES_PREFIX}{peer_hex}/{branch}"))
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, RefError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RefError::Io(e)),
        };
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
