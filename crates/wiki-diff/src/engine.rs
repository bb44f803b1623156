//! Two-sided file-set comparison.
//!
//! A side is anything that can list `(mode, ident, path)` records and fetch
//! a blob's text: the working tree, the index, or a commit's tree. The
//! engine itself is oblivious to where either side comes from.

use std::collections::{HashMap, HashSet};

use wiki_hash::Ident;
use wiki_index::IndexEntry;
use wiki_repository::Repository;

use crate::algorithm::char_diff;
use crate::{DiffError, DiffRun, Sign};

/// Capability shared by everything the engine can compare.
pub trait FileSource {
    /// `(mode, ident, path)` records for every file on this side.
    fn files_list(&self) -> Result<Vec<IndexEntry>, DiffError>;

    /// The UTF-8 contents behind an ident from `files_list`.
    fn fetch(&self, ident: &Ident) -> Result<String, DiffError>;
}

fn decode_text(ident: &Ident, bytes: Vec<u8>) -> Result<String, DiffError> {
    String::from_utf8(bytes).map_err(|_| DiffError::NotText(*ident))
}

/// The working tree: paths named by the index, contents from disk.
pub struct WorktreeSource<'a> {
    repo: &'a Repository,
    files: Vec<IndexEntry>,
    paths_by_ident: HashMap<Ident, String>,
}

impl<'a> WorktreeSource<'a> {
    pub fn new(repo: &'a Repository) -> Result<Self, DiffError> {
        let mut files = Vec::new();
        let mut paths_by_ident = HashMap::new();
        for entry in repo.index().read()? {
            let ident = repo.hash_file(&entry.path)?;
            paths_by_ident.insert(ident, entry.path.clone());
            files.push(IndexEntry::new(entry.mode, ident, entry.path));
        }
        Ok(Self {
            repo,
            files,
            paths_by_ident,
        })
    }
}

impl FileSource for WorktreeSource<'_> {
    fn files_list(&self) -> Result<Vec<IndexEntry>, DiffError> {
        Ok(self.files.clone())
    }

    fn fetch(&self, ident: &Ident) -> Result<String, DiffError> {
        let path = self
            .paths_by_ident
            .get(ident)
            .ok_or(wiki_odb::OdbError::NotFound(*ident))?;
        decode_text(ident, self.repo.read_work_file(path)?)
    }
}

/// The index: records verbatim, contents from the object store.
pub struct IndexSource<'a> {
    repo: &'a Repository,
}

impl<'a> IndexSource<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }
}

impl FileSource for IndexSource<'_> {
    fn files_list(&self) -> Result<Vec<IndexEntry>, DiffError> {
        Ok(self.repo.index().read()?)
    }

    fn fetch(&self, ident: &Ident) -> Result<String, DiffError> {
        decode_text(ident, self.repo.store().fetch_blob(ident)?)
    }
}

/// A commit's tree, flattened to full paths.
pub struct CommitSource<'a> {
    repo: &'a Repository,
    files: Vec<IndexEntry>,
}

impl<'a> std::fmt::Debug for CommitSource<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitSource")
            .field("files", &self.files)
            .finish()
    }
}

impl<'a> CommitSource<'a> {
    /// Resolve an optional ident prefix (defaulting to the current tip) and
    /// materialize that commit's tree.
    pub fn new(repo: &'a Repository, ident_prefix: Option<&str>) -> Result<Self, DiffError> {
        let commit = match ident_prefix {
            Some(prefix) => repo.store().fuzzy_match(prefix)?,
            None => repo.refs().head_commit().map_err(wiki_repository::RepoError::from)?,
        }
        .ok_or(DiffError::NoCommit)?;
        let files = repo.commit_files(&commit)?;
        Ok(Self { repo, files })
    }
}

impl FileSource for CommitSource<'_> {
    fn files_list(&self) -> Result<Vec<IndexEntry>, DiffError> {
        Ok(self.files.clone())
    }

    fn fetch(&self, ident: &Ident) -> Result<String, DiffError> {
        decode_text(ident, self.repo.store().fetch_blob(ident)?)
    }
}

/// Compares two file sets, producing per-file run lists.
pub struct DifferenceEngine<'a> {
    side1: &'a dyn FileSource,
    side2: &'a dyn FileSource,
}

impl<'a> DifferenceEngine<'a> {
    pub fn new(side1: &'a dyn FileSource, side2: &'a dyn FileSource) -> Self {
        Self { side1, side2 }
    }

    /// Per-file diffs: files only on side 1 as full deletions, files only
    /// on side 2 as full insertions, then changed shared files. Files with
    /// equal idents on both sides are omitted.
    pub fn results(&self) -> Result<Vec<(String, Vec<DiffRun>)>, DiffError> {
        let files1 = self.side1.files_list()?;
        let files2 = self.side2.files_list()?;
        let paths1: HashSet<&str> = files1.iter().map(|e| e.path.as_str()).collect();
        let paths2: HashSet<&str> = files2.iter().map(|e| e.path.as_str()).collect();

        let mut results = Vec::new();

        for entry in files1.iter().filter(|e| !paths2.contains(e.path.as_str())) {
            let contents = self.side1.fetch(&entry.ident)?;
            results.push((entry.path.clone(), vec![DiffRun::new(Sign::Delete, contents)]));
        }

        for entry in files2.iter().filter(|e| !paths1.contains(e.path.as_str())) {
            let contents = self.side2.fetch(&entry.ident)?;
            results.push((entry.path.clone(), vec![DiffRun::new(Sign::Insert, contents)]));
        }

        let idents1: HashMap<&str, &Ident> =
            files1.iter().map(|e| (e.path.as_str(), &e.ident)).collect();
        for entry in files2.iter().filter(|e| paths1.contains(e.path.as_str())) {
            let previous_ident = idents1[entry.path.as_str()];
            if *previous_ident == entry.ident {
                continue;
            }
            let previous = self.side1.fetch(previous_ident)?;
            let new = self.side2.fetch(&entry.ident)?;
            results.push((entry.path.clone(), char_diff(&previous, &new)));
        }

        Ok(results)
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

    fn add(repo: &Repository, rel: &str, data: &str) {
        repo.write_work_file(rel, data.as_bytes()).unwrap();
        repo.add_file(rel).unwrap();
    }

    #[test]
    fn commit_vs_worktree_edit() {
        let (_dir, repo) = repo();
        add(&repo, "a.txt", "hello\n");
        repo.commit(None).unwrap();

        repo.write_work_file("a.txt", b"hello world\n").unwrap();

        let commit = CommitSource::new(&repo, None).unwrap();
        let worktree = WorktreeSource::new(&repo).unwrap();
        let results = DifferenceEngine::new(&commit, &worktree).results().unwrap();

        assert_eq!(results.len(), 1);
        let (path, runs) = &results[0];
        assert_eq!(path, "a.txt");
        let tagged: Vec<_> = runs.iter().map(|r| (r.sign.value(), r.text.as_str())).collect();
        assert_eq!(tagged, [(0, "hello"), (1, " world"), (0, "\n")]);
    }

    #[test]
    fn unchanged_files_are_omitted() {
        let (_dir, repo) = repo();
        add(&repo, "same.txt", "stable\n");
        repo.commit(None).unwrap();

        let commit = CommitSource::new(&repo, None).unwrap();
        let index = IndexSource::new(&repo);
        let results = DifferenceEngine::new(&commit, &index).results().unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn side_only_files_are_whole_runs() {
        let (_dir, repo) = repo();
        add(&repo, "kept.txt", "kept\n");
        add(&repo, "gone.txt", "gone\n");
        repo.commit(None).unwrap();

        // Stage a state where gone.txt is dropped and added.txt is new.
        repo.index().remove("gone.txt").unwrap();
        add(&repo, "added.txt", "added\n");

        let commit = CommitSource::new(&repo, None).unwrap();
        let index = IndexSource::new(&repo);
        let results = DifferenceEngine::new(&commit, &index).results().unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "gone.txt");
        assert_eq!(results[0].1, vec![DiffRun::new(Sign::Delete, "gone\n")]);
        assert_eq!(results[1].0, "added.txt");
        assert_eq!(results[1].1, vec![DiffRun::new(Sign::Insert, "added\n")]);
    }

    #[test]
    fn commit_source_resolves_prefix() {
        let (_dir, repo) = repo();
        add(&repo, "a.txt", "v1\n");
        let c1 = repo.commit(None).unwrap();
        add(&repo, "a.txt", "v2\n");
        repo.commit(None).unwrap();

        let prefix = &c1.to_hex()[..12];
        let old = CommitSource::new(&repo, Some(prefix)).unwrap();
        let index = IndexSource::new(&repo);
        let results = DifferenceEngine::new(&old, &index).results().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "a.txt");
    }

    #[test]
    fn no_commit_errors() {
        let (_dir, repo) = repo();
        assert!(matches!(
            CommitSource::new(&repo, None).unwrap_err(),
            DiffError::NoCommit
        ));
    }
}
