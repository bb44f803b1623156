use std::path::{Path, PathBuf};

use crate::{RepoError, DOT_DIR};

/// Walk up from `start` until a directory containing `.darkwiki` is found.
pub(crate) fn find_root(start: &Path) -> Result<PathBuf, RepoError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(DOT_DIR).is_dir() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(RepoError::NotARepository(start.to_path_buf()));
        }
    }
}
