//! The `Repository` value: paths to the `.gitgo` directory and its
//! subsystems, passed explicitly into every component instead of
//! relying on process-global path state.

mod error;

pub use error::RepoError;

use std::fs;
use std::path::{Path, PathBuf};

use gitgo_hash::ObjectId;
use gitgo_loose::LooseObjectStore;
use gitgo_refs::Refs;

const GITGO_DIR: &str = ".gitgo";

/// Root, `.gitgo` directory, and the paths to its subsystems
/// (`objects/`, `refs/`, `HEAD`, `index`).
pub struct Repository {
    root: PathBuf,
    git_dir: PathBuf,
    objects_dir: PathBuf,
    refs_dir: PathBuf,
    index_path: PathBuf,
}

impl Repository {
    /// Create `.gitgo/objects` and `.gitgo/refs` under `root`, creating
    /// `root` itself if it doesn't exist. Re-running on an
    /// already-initialized repository is a no-op.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let repo = Self::at(root);
        fs::create_dir_all(&repo.objects_dir)?;
        fs::create_dir_all(&repo.refs_dir)?;
        Ok(repo)
    }

    /// Open an existing repository rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let repo = Self::at(root.into());
        if !repo.git_dir.is_dir() {
            return Err(RepoError::NotFound(repo.root));
        }
        Ok(repo)
    }

    fn at(root: PathBuf) -> Self {
        let git_dir = root.join(GITGO_DIR);
        Self {
            objects_dir: git_dir.join("objects"),
            refs_dir: git_dir.join("refs"),
            index_path: git_dir.join("index"),
            git_dir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    pub fn refs_dir(&self) -> &Path {
        &self.refs_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn head_path(&self) -> PathBuf {
        self.git_dir.join("HEAD")
    }

    /// Access to the loose object store rooted at `objects_dir`.
    pub fn odb(&self) -> LooseObjectStore {
        LooseObjectStore::open(&self.objects_dir)
    }

    /// Access to the HEAD pointer.
    pub fn refs(&self) -> Refs {
        Refs::new(self.head_path())
    }

    /// The current HEAD commit oid, or `None` before the first commit.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs().read_head()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        let repo = Repository::init(&root).unwrap();

        assert!(repo.objects_dir().is_dir());
        assert!(repo.refs_dir().is_dir());
        assert_eq!(repo.git_dir(), root.join(".gitgo"));
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        Repository::init(dir.path()).unwrap();
        assert!(dir.path().join(".gitgo/objects").is_dir());
    }

    #[test]
    fn open_missing_repo_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::NotFound(_))
        ));
    }

    #[test]
    fn open_after_init_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        assert!(repo.head_oid().unwrap().is_none());
    }
}
