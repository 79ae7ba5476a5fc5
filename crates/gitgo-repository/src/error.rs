use std::path::PathBuf;

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a gitgo repository: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Ref(#[from] gitgo_refs::RefError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
