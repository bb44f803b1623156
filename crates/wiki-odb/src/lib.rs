//! Content-addressed object store.
//!
//! Objects live as flat files under `objects/<hexident>`, each holding
//! `"<KIND>:" || body`. Writes are idempotent: re-adding identical bytes is
//! a no-op that returns the same identifier.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lru::LruCache;
use wiki_hash::Ident;
use wiki_object::{CommitRecord, Object, ObjectKind, TreeEntry};

pub use error::OdbError;

mod error {
    use wiki_hash::Ident;
    use wiki_object::ObjectError;

    #[derive(Debug, thiserror::Error)]
    pub enum OdbError {
        #[error("object not found: {0}")]
        NotFound(Ident),

        #[error("corrupt object {ident}: {source}")]
        Corrupt {
            ident: Ident,
            source: ObjectError,
        },

        #[error("object {ident} is a {actual}, expected {expected}")]
        KindMismatch {
            ident: Ident,
            expected: wiki_object::ObjectKind,
            actual: wiki_object::ObjectKind,
        },

        #[error(transparent)]
        Io(#[from] std::io::Error),
    }
}

/// Number of decoded objects kept in the read cache.
const CACHE_CAPACITY: usize = 1024;

/// The object store: flat `objects/` directory plus an LRU read cache.
pub struct ObjectStore {
    objects_dir: PathBuf,
    cache: Mutex<LruCache<Ident, Object>>,
}

impl ObjectStore {
    /// Open the store over the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("nonzero capacity"),
            )),
        }
    }

    /// Path of an object file.
    fn object_path(&self, ident: &Ident) -> PathBuf {
        self.objects_dir.join(ident.to_hex())
    }

    /// Whether the object exists on disk.
    pub fn contains(&self, ident: &Ident) -> bool {
        self.object_path(ident).is_file()
    }

    /// Store an object. Returns its identifier.
    pub fn add(&self, object: &Object) -> Result<Ident, OdbError> {
        let body = object.serialize_body();
        self.add_body(object.kind(), &body)
    }

    /// Store a raw body with a known kind. Returns its identifier.
    ///
    /// The file is written to a temp name first and renamed into place;
    /// losing the rename race to another writer still counts as success.
    pub fn add_body(&self, kind: ObjectKind, body: &[u8]) -> Result<Ident, OdbError> {
        let ident = wiki_hash::hash_body(body);
        let final_path = self.object_path(&ident);
        if final_path.is_file() {
            return Ok(ident);
        }

        let tmp_path = self.objects_dir.join(format!(
            "tmp_obj_{}_{}",
            std::process::id(),
            ident.to_hex()
        ));
        let mut data = Vec::with_capacity(kind.name().len() + 1 + body.len());
        data.extend_from_slice(kind.name().as_bytes());
        data.push(b':');
        data.extend_from_slice(body);
        fs::write(&tmp_path, &data)?;

        match fs::rename(&tmp_path, &final_path) {
            Ok(()) => Ok(ident),
            Err(_) if final_path.exists() => {
                let _ = fs::remove_file(&tmp_path);
                Ok(ident)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(OdbError::Io(e))
            }
        }
    }

    /// Store a blob.
    pub fn add_blob(&self, data: &[u8]) -> Result<Ident, OdbError> {
        self.add_body(ObjectKind::Blob, data)
    }

    /// Store a tree.
    pub fn add_tree(&self, entries: &[TreeEntry]) -> Result<Ident, OdbError> {
        self.add(&Object::Tree(entries.to_vec()))
    }

    /// Store a commit.
    pub fn add_commit(&self, record: &CommitRecord) -> Result<Ident, OdbError> {
        self.add(&Object::Commit(record.clone()))
    }

    /// Read and decode an object.
    pub fn fetch(&self, ident: &Ident) -> Result<Object, OdbError> {
        if let Some(object) = self.cache.lock().unwrap().get(ident) {
            return Ok(object.clone());
        }

        let data = match fs::read(self.object_path(ident)) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OdbError::NotFound(*ident));
            }
            Err(e) => return Err(OdbError::Io(e)),
        };
        let object = Object::parse(&data).map_err(|source| OdbError::Corrupt {
            ident: *ident,
            source,
        })?;

        self.cache.lock().unwrap().put(*ident, object.clone());
        Ok(object)
    }

    /// Fetch an object that must be a blob.
    pub fn fetch_blob(&self, ident: &Ident) -> Result<Vec<u8>, OdbError> {
        match self.fetch(ident)? {
            Object::Blob(data) => Ok(data),
            other => Err(OdbError::KindMismatch {
                ident: *ident,
                expected: ObjectKind::Blob,
                actual: other.kind(),
            }),
        }
    }

    /// Fetch an object that must be a tree.
    pub fn fetch_tree(&self, ident: &Ident) -> Result<Vec<TreeEntry>, OdbError> {
        match self.fetch(ident)? {
            Object::Tree(entries) => Ok(entries),
            other => Err(OdbError::KindMismatch {
                ident: *ident,
                expected: ObjectKind::Tree,
                actual: other.kind(),
            }),
        }
    }

    /// Fetch an object that must be a commit.
    pub fn fetch_commit(&self, ident: &Ident) -> Result<CommitRecord, OdbError> {
        match self.fetch(ident)? {
            Object::Commit(record) => Ok(record),
            other => Err(OdbError::KindMismatch {
                ident: *ident,
                expected: ObjectKind::Commit,
                actual: other.kind(),
            }),
        }
    }

    /// The kind of a stored object.
    pub fn object_kind(&self, ident: &Ident) -> Result<ObjectKind, OdbError> {
        Ok(self.fetch(ident)?.kind())
    }

    /// Identifiers of all stored objects, in no particular order.
    pub fn list(&self) -> Result<Vec<Ident>, OdbError> {
        let mut idents = Vec::new();
        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            // Skip temp files and anything else that is not a full ident.
            if let Ok(ident) = Ident::from_hex(name) {
                idents.push(ident);
            }
        }
        Ok(idents)
    }

    /// Resolve a hex prefix to a stored identifier.
    ///
    /// Returns `None` when zero or more than one object matches.
    pub fn fuzzy_match(&self, prefix: &str) -> Result<Option<Ident>, OdbError> {
        let mut found = None;
        for ident in self.list()? {
            if ident.starts_with_hex(prefix) {
                if found.is_some() {
                    return Ok(None);
                }
                found = Some(ident);
            }
        }
        Ok(found)
    }
}
