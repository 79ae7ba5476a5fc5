use std::path::PathBuf;

/// Base error type for gitgo-utils operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("date parse error: {0}")]
    DateParse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Lock file specific errors, distinguishing the outcomes a caller must
/// react to differently: a held lock is recoverable (the user can retry
/// or remove a stale lock); the rest are fatal environment problems.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another process (or a leftover lock from a crashed one) holds the lock.
    #[error("unable to create '{path}': already locked")]
    AlreadyLocked { path: PathBuf },

    /// The lock's parent directory doesn't exist.
    #[error("unable to create '{path}': parent directory does not exist")]
    MissingParentDirectory { path: PathBuf },

    /// The process lacks permission to create the lock file.
    #[error("unable to create '{path}': permission denied")]
    NoPermission { path: PathBuf },

    /// Any other I/O failure while creating the lock.
    #[error("unable to create lock file '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to commit lock file '{path}': {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `write`/`commit`/`rollback` called outside the `Held` state.
    #[error("lock file '{path}' used outside its held state")]
    StaleLock { path: PathBuf },
}
