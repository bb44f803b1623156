//! Branch merge: find the common ancestor of two tips, three-way merge the
//! files both sides changed, and write the merge commit.

mod ancestor;

pub use ancestor::common_ancestor;

use std::collections::HashMap;

use wiki_hash::Ident;
use wiki_index::IndexEntry;
use wiki_repository::Repository;

pub use error::MergeError;

mod error {
    #[derive(Debug, thiserror::Error)]
    pub enum MergeError {
        #[error("commits share no common ancestor")]
        NoCommonAncestor,

        #[error("blob {0} is not UTF-8 text")]
        NotText(wiki_hash::Ident),

        #[error(transparent)]
        Odb(#[from] wiki_odb::OdbError),

        #[error(transparent)]
        Index(#[from] wiki_index::IndexError),

        #[error(transparent)]
        Repo(#[from] wiki_repository::RepoError),
    }
}

/// Merges one branch tip into another.
///
/// The caller passes the current branch's tip as `local`; the merge commit
/// is written onto the current ref with `previous_commit = local`.
pub struct MergeEngine<'a> {
    repo: &'a Repository,
}

impl<'a> MergeEngine<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Merge `merge_tip` into `local_tip` and return the new commit.
    ///
    /// Only files that actually diverge are touched: a file changed on both
    /// sides is three-way merged through its origin blob; a file changed on
    /// both sides but absent from the origin keeps the local version; files
    /// present only on the merge side are carried over.
    pub fn merge(&self, local_tip: &Ident, merge_tip: &Ident) -> Result<Ident, MergeError> {
        let origin = common_ancestor(self.repo, local_tip, merge_tip)?;

        let local_files = self.repo.commit_files(local_tip)?;
        let merge_files = self.repo.commit_files(merge_tip)?;
        let origin_files = self.repo.commit_files(&origin)?;

        let merge_map: HashMap<&str, &IndexEntry> =
            merge_files.iter().map(|e| (e.path.as_str(), e)).collect();
        let origin_map: HashMap<&str, &IndexEntry> =
            origin_files.iter().map(|e| (e.path.as_str(), e)).collect();
        let local_paths: HashMap<&str, ()> =
            local_files.iter().map(|e| (e.path.as_str(), ())).collect();

        let mut new_index: Vec<IndexEntry> = Vec::with_capacity(local_files.len());

        for local in &local_files {
            let diverged = merge_map
                .get(local.path.as_str())
                .filter(|m| m.ident != local.ident);
            let Some(merge) = diverged else {
                new_index.push(local.clone());
                continue;
            };

            match origin_map.get(local.path.as_str()) {
                Some(origin) => {
                    let merged =
                        self.merge_blobs(&origin.ident, &local.ident, &merge.ident)?;
                    tracing::info!(path = %local.path, "three-way merged");
                    new_index.push(IndexEntry::new(local.mode.clone(), merged, &local.path));
                }
                None => {
                    // Both sides changed a file the origin never had. Keep
                    // the local version; a full rebase of the merge side's
                    // edit is out of scope.
                    tracing::warn!(path = %local.path, "diverged without origin, keeping local");
                    new_index.push(local.clone());
                }
            }
        }

        for merge in &merge_files {
            if !local_paths.contains_key(merge.path.as_str()) {
                tracing::info!(path = %merge.path, "adding file from merge side");
                new_index.push(merge.clone());
            }
        }

        let tree = wiki_index::write_tree(self.repo.store(), &new_index)?;
        let commit = self.repo.commit(Some(tree))?;
        Ok(commit)
    }

    /// Three-way merge the three blob texts and store the result.
    fn merge_blobs(
        &self,
        origin: &Ident,
        local: &Ident,
        merge: &Ident,
    ) -> Result<Ident, MergeError> {
        let origin_text = self.fetch_text(origin)?;
        let local_text = self.fetch_text(local)?;
        let merge_text = self.fetch_text(merge)?;

        let runs = wiki_diff::three_way_merge(&origin_text, &local_text, &merge_text);
        let merged = wiki_diff::new_text(&runs);
        Ok(self.repo.store().add_blob(merged.as_bytes())?)
    }

    fn fetch_text(&self, ident: &Ident) -> Result<String, MergeError> {
        let bytes = self.repo.store().fetch_blob(ident)?;
        String::from_utf8(bytes).map_err(|_| MergeError::NotText(*ident))
    }
}
