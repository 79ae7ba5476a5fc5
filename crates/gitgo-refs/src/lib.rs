//! The HEAD pointer: a single file holding the current commit oid.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use gitgo_hash::ObjectId;
use gitgo_utils::lockfile::LockFile;

/// Errors from ref operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("HEAD contains an invalid oid: {0}")]
    InvalidOid(String),

    #[error(transparent)]
    Lock(#[from] gitgo_utils::UtilError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The HEAD pointer at `<repo>/.gitgo/HEAD`.
pub struct Refs {
    head_path: PathBuf,
}

impl Refs {
    pub fn new(head_path: impl Into<PathBuf>) -> Self {
        Self {
            head_path: head_path.into(),
        }
    }

    /// Read the current HEAD commit oid, or `None` before the first commit.
    pub fn read_head(&self) -> Result<Option<ObjectId>, RefError> {
        let content = match fs::read_to_string(&self.head_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = content.trim_end_matches('\n');
        if trimmed.is_empty() {
            return Ok(None);
        }
        let oid = ObjectId::from_hex(trimmed).map_err(|_| RefError::InvalidOid(trimmed.to_string()))?;
        Ok(Some(oid))
    }

    /// Atomically point HEAD at `oid`. Fails if the HEAD lock is denied.
    pub fn update_head(&self, oid: ObjectId) -> Result<(), RefError> {
        let mut lock = LockFile::acquire(&self.head_path)?;
        lock.write_all(format!("{}\n", oid.to_hex()).as_bytes())?;
        lock.commit()?;
        Ok(())
    }

    pub fn head_path(&self) -> &Path {
        &self.head_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_head_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let refs = Refs::new(dir.path().join("HEAD"));
        assert!(refs.read_head().unwrap().is_none());
    }

    #[test]
    fn update_then_read_head_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let refs = Refs::new(dir.path().join("HEAD"));
        let oid = ObjectId::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap();

        refs.update_head(oid).unwrap();
        assert_eq!(refs.read_head().unwrap(), Some(oid));

        let raw = fs::read_to_string(dir.path().join("HEAD")).unwrap();
        assert_eq!(raw, format!("{}\n", oid.to_hex()));
    }

    #[test]
    fn empty_head_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HEAD");
        fs::write(&path, b"").unwrap();
        let refs = Refs::new(path);
        assert!(refs.read_head().unwrap().is_none());
    }

    #[test]
    fn invalid_head_contents_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HEAD");
        fs::write(&path, b"not-an-oid\n").unwrap();
        let refs = Refs::new(path);
        assert!(matches!(refs.read_head(), Err(RefError::InvalidOid(_))));
    }
}
