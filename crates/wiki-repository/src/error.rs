use std::path::PathBuf;

/// Errors produced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a darkwiki repository (no .darkwiki found up from {0})")]
    NotARepository(PathBuf),

    #[error("path is outside the repository: {0}")]
    OutsideRepository(PathBuf),

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error(transparent)]
    Odb(#[from] wiki_odb::OdbError),

    #[error(transparent)]
    Index(#[from] wiki_index::IndexError),

    #[error(transparent)]
    Ref(#[from] wiki_ref::RefError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
