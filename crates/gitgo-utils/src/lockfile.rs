use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

/// RAII lock file guard implementing git's lock file protocol:
///
/// - Create `<path>.lock` with `O_CREAT | O_EXCL`.
/// - Write the new contents to the lock file.
/// - Atomically rename `.lock` onto the target on commit.
/// - Remove `.lock` on rollback, or on drop if neither commit nor
///   rollback ran.
///
/// The lock moves through `Idle -> Held -> {Committed | Rolled-back}`.
/// `write`/`commit`/`rollback` are only valid while `Held`; this is
/// enforced at the call sites below rather than with a separate state
/// field, since `file` being `None` already means the lock is no
/// longer held.
pub struct LockFile {
    path: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

const LOCK_SUFFIX: &str = ".lock";

impl LockFile {
    /// Acquire a lock on the given path by exclusively creating `path.lock`.
    ///
    /// Distinguishes the outcome so callers can react appropriately:
    /// an existing lock is recoverable (another process holds it); a
    /// missing parent directory or a permission failure are fatal
    /// environment problems.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_path = PathBuf::from(format!("{}{}", path.display(), LOCK_SUFFIX));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| classify_acquire_error(&lock_path, e))?;

        Ok(Self {
            path,
            lock_path,
            file: Some(file),
            committed: false,
        })
    }

    /// Try to acquire without treating a held lock as an error.
    ///
    /// Returns `Ok(None)` when another process already holds the lock,
    /// `Ok(Some(lockfile))` on success, or `Err` for any other failure.
    pub fn try_acquire(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match Self::acquire(path) {
            Ok(lk) => Ok(Some(lk)),
            Err(UtilError::Lock(LockError::AlreadyLocked { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Write the full new contents, then atomically rename the lock
    /// file onto the target.
    pub fn commit(mut self) -> Result<()> {
        let mut file = self.file.take().ok_or_else(|| {
            UtilError::Lock(LockError::StaleLock {
                path: self.lock_path.clone(),
            })
        })?;

        file.flush().map_err(|e| {
            UtilError::Lock(LockError::Commit {
                path: self.lock_path.clone(),
                source: e,
            })
        })?;
        file.sync_all().map_err(|e| {
            UtilError::Lock(LockError::Commit {
                path: self.lock_path.clone(),
                source: e,
            })
        })?;
        drop(file);

        fs::rename(&self.lock_path, &self.path).map_err(|e| {
            UtilError::Lock(LockError::Commit {
                path: self.lock_path.clone(),
                source: e,
            })
        })?;

        self.committed = true;
        Ok(())
    }

    /// Discard the held lock without writing the target.
    pub fn rollback(mut self) -> Result<()> {
        if self.file.take().is_none() {
            return Err(UtilError::Lock(LockError::StaleLock {
                path: self.lock_path.clone(),
            }));
        }
        if self.lock_path.exists() {
            fs::remove_file(&self.lock_path)?;
        }
        self.committed = true;
        Ok(())
    }
}

/// Map the raw I/O error from creating `path.lock` into one of the
/// four distinguishable denial outcomes.
fn classify_acquire_error(lock_path: &Path, e: io::Error) -> UtilError {
    let err = match e.kind() {
        io::ErrorKind::AlreadyExists => LockError::AlreadyLocked {
            path: lock_path.to_path_buf(),
        },
        io::ErrorKind::NotFound => LockError::MissingParentDirectory {
            path: lock_path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => LockError::NoPermission {
            path: lock_path.to_path_buf(),
        },
        _ => LockError::Create {
            path: lock_path.to_path_buf(),
            source: e,
        },
    };
    UtilError::Lock(err)
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}
