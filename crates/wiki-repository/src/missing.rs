use std::collections::HashSet;

use wiki_hash::Ident;
use wiki_object::Object;

use crate::{RepoError, Repository};

impl Repository {
    /// Objects reachable from `tip` that are absent from the local store,
    /// in dependency order, each at most once.
    ///
    /// A commit's previous chain is resolved before its tree; a tree's
    /// children are resolved as they are reached. Objects whose container is
    /// itself missing surface on a later round, once the container arrives.
    pub fn missing_objects(&self, tip: &Ident) -> Result<Vec<Ident>, RepoError> {
        let mut missing = Vec::new();
        let mut seen = HashSet::new();
        self.collect_missing(tip, &mut missing, &mut seen)?;
        Ok(missing)
    }

    fn collect_missing(
        &self,
        ident: &Ident,
        missing: &mut Vec<Ident>,
        seen: &mut HashSet<Ident>,
    ) -> Result<(), RepoError> {
        if !seen.insert(*ident) {
            return Ok(());
        }
        if !self.store().contains(ident) {
            missing.push(*ident);
            return Ok(());
        }
        match self.store().fetch(ident)? {
            Object::Blob(_) => {}
            Object::Tree(entries) => {
                for entry in entries {
                    self.collect_missing(&entry.ident, missing, seen)?;
                }
            }
            Object::Commit(record) => {
                if let Some(previous) = record.previous_commit {
                    self.collect_missing(&previous, missing, seen)?;
                }
                self.collect_missing(&record.tree, missing, seen)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn complete_commit_has_nothing_missing() {
        let (_dir, repo) = repo();
        repo.write_work_file("a.txt", b"hello").unwrap();
        repo.add_file("a.txt").unwrap();
        let commit = repo.commit(None).unwrap();
        assert!(repo.missing_objects(&commit).unwrap().is_empty());
    }

    #[test]
    fn absent_tip_is_reported() {
        let (_dir, repo) = repo();
        let tip = Ident::from_raw([9; 32]);
        assert_eq!(repo.missing_objects(&tip).unwrap(), vec![tip]);
    }

    #[test]
    fn missing_blob_found_through_tree() {
        let (dir, repo) = repo();
        repo.write_work_file("a.txt", b"payload").unwrap();
        let blob = repo.add_file("a.txt").unwrap();
        let commit = repo.commit(None).unwrap();

        // Remove the blob object behind the store's back.
        std::fs::remove_file(dir.path().join(".darkwiki/objects").join(blob.to_hex()))
            .unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        assert_eq!(repo.missing_objects(&commit).unwrap(), vec![blob]);
    }

    #[test]
    fn previous_chain_resolved_before_tree() {
        let (dir, repo) = repo();
        repo.write_work_file("a.txt", b"v1").unwrap();
        repo.add_file("a.txt").unwrap();
        let c1 = repo.commit(None).unwrap();
        repo.write_work_file("a.txt", b"v2").unwrap();
        let blob2 = repo.add_file("a.txt").unwrap();
        let c2 = repo.commit(None).unwrap();

        let objects = dir.path().join(".darkwiki/objects");
        std::fs::remove_file(objects.join(c1.to_hex())).unwrap();
        std::fs::remove_file(objects.join(blob2.to_hex())).unwrap();
        let repo = Repository::open(dir.path()).unwrap();

        // The missing ancestor commit is emitted before the tip's tree
        // dependencies.
        assert_eq!(repo.missing_objects(&c2).unwrap(), vec![c1, blob2]);
    }
}
