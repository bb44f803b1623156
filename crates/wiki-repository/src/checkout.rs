use std::collections::HashSet;
use std::fs;

use wiki_hash::Ident;
use wiki_index::{DirectoryTree, IndexEntry};

use crate::{RepoError, Repository};

impl Repository {
    /// Switch to a branch.
    ///
    /// With an ident, the branch ref is (re)written to it and the working
    /// tree is updated from the current tip's tree to the new commit's tree.
    /// Either way HEAD ends up pointing at `refs/heads/<name>`.
    pub fn switch_branch(&self, name: &str, ident: Option<Ident>) -> Result<(), RepoError> {
        if let Some(ident) = ident {
            let last = self.refs().head_commit()?;
            self.refs().write_branch(name, &ident)?;
            self.update_files(last.as_ref(), &ident)?;
        }
        self.refs().set_head(&format!("refs/heads/{name}"))?;
        Ok(())
    }

    /// Bring the working tree from `last`'s snapshot to `new`'s.
    fn update_files(&self, last: Option<&Ident>, new: &Ident) -> Result<(), RepoError> {
        let previous_files = match last {
            Some(last) => self.commit_files(last)?,
            None => Vec::new(),
        };
        let new_files = self.commit_files(new)?;

        self.remove_old_files(&previous_files, &new_files)?;
        self.add_new_files(&new_files)?;
        self.remove_empty_directories(&previous_files)?;
        Ok(())
    }

    /// Delete working-tree files present in the old snapshot but not the new.
    fn remove_old_files(
        &self,
        previous_files: &[IndexEntry],
        new_files: &[IndexEntry],
    ) -> Result<(), RepoError> {
        let keep: HashSet<&str> = new_files.iter().map(|e| e.path.as_str()).collect();
        for entry in previous_files {
            if !keep.contains(entry.path.as_str()) {
                self.remove_work_file(&entry.path)?;
            }
        }
        Ok(())
    }

    /// Materialize every blob of the new snapshot onto disk.
    fn add_new_files(&self, new_files: &[IndexEntry]) -> Result<(), RepoError> {
        for entry in new_files {
            let contents = self.store().fetch_blob(&entry.ident)?;
            self.write_work_file(&entry.path, &contents)?;
        }
        Ok(())
    }

    /// Remove directories of the old snapshot that became empty, children
    /// before parents so nested empties collapse upward.
    fn remove_empty_directories(&self, previous_files: &[IndexEntry]) -> Result<(), RepoError> {
        let tree = DirectoryTree::build(previous_files);
        for node in tree.post_order() {
            let Some(rel) = tree.full_path(node) else {
                continue;
            };
            let path = self.work_path(&rel);
            if !path.is_dir() {
                continue;
            }
            let empty = fs::read_dir(&path)?.next().is_none();
            if empty {
                fs::remove_dir(&path)?;
            }
        }
        Ok(())
    }
}
