//! The binary staging file (index): an ordered map from path to
//! [`IndexEntry`], with an incrementally maintained parents map enforcing
//! the file/directory exclusion invariant.
//!
//! Two ways to obtain an `Index`: [`Index::load`] for a lock-free
//! read-only snapshot (used by `commit`), and [`Index::hold_for_update`]
//! for the locked read-modify-write path (used by `add` and `status`).

mod entry;
mod read;
mod write;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use gitgo_hash::ObjectId;
use gitgo_utils::lockfile::LockFile;

pub use entry::{IndexEntry, Stat};

/// Errors from index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("bad index signature")]
    BadSignature,

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("index checksum mismatch")]
    ChecksumMismatch,

    #[error("truncated index file")]
    Truncated,

    #[error("invalid mode {0:o} in index entry")]
    BadMode(u32),

    #[error("index entry path is not valid UTF-8")]
    BadPathEncoding,

    #[error("index is not held for update")]
    NotHeld,

    #[error(transparent)]
    Lock(#[from] gitgo_utils::UtilError),

    #[error(transparent)]
    Hash(#[from] gitgo_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of [`Index::write_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The index was unchanged since load, so nothing was written.
    NoChange,
    /// The index was serialized and committed to disk.
    Written,
}

/// The staging area: entries keyed by path, plus the parents map used to
/// answer "is this directory tracked" in O(1) and keep conflict
/// resolution O(children) instead of O(entries).
pub struct Index {
    path: PathBuf,
    entries: BTreeMap<String, IndexEntry>,
    parents: BTreeMap<String, BTreeSet<String>>,
    lock: Option<LockFile>,
    changed: bool,
}

impl Index {
    /// Read-only load: missing file means an empty index, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let path = path.into();
        let entries = read::read_entries(&path)?;
        Ok(Self::from_entries(path, entries, None))
    }

    /// Acquire the index lock and load for a read-modify-write session.
    /// Returns `Ok(None)` when another process already holds the lock.
    pub fn hold_for_update(path: impl Into<PathBuf>) -> Result<Option<Self>, IndexError> {
        let path = path.into();
        let Some(lock) = LockFile::try_acquire(&path)? else {
            return Ok(None);
        };
        let entries = read::read_entries(&path)?;
        Ok(Some(Self::from_entries(path, entries, Some(lock))))
    }

    fn from_entries(
        path: PathBuf,
        entries: Vec<IndexEntry>,
        lock: Option<LockFile>,
    ) -> Self {
        let mut index = Self {
            path,
            entries: BTreeMap::new(),
            parents: BTreeMap::new(),
            lock,
            changed: false,
        };
        for entry in entries {
            let path = entry.path.clone();
            index.entries.insert(path.clone(), entry);
            index.register_parents(&path);
        }
        index
    }

    /// Insert or replace the entry at `path`, resolving file/directory
    /// conflicts against existing entries first.
    pub fn add(&mut self, path: &str, oid: ObjectId, stat: &Stat) {
        self.resolve_conflicts(path);
        self.entries
            .insert(path.to_string(), IndexEntry::new(path, oid, stat));
        self.register_parents(path);
        self.changed = true;
    }

    /// Remove any ancestor-as-file and any descendant-as-directory
    /// conflicts that would violate invariant 1–2 if `path` were added.
    fn resolve_conflicts(&mut self, path: &str) {
        for ancestor in ancestors(path) {
            if self.entries.remove(&ancestor).is_some() {
                self.unregister_parents(&ancestor);
            }
        }

        if let Some(children) = self.parents.remove(path) {
            for child in children {
                self.entries.remove(&child);
                self.unregister_parents_except(&child, path);
            }
        }
    }

    fn register_parents(&mut self, path: &str) {
        for ancestor in ancestors(path) {
            self.parents
                .entry(ancestor)
                .or_default()
                .insert(path.to_string());
        }
    }

    fn unregister_parents(&mut self, path: &str) {
        self.unregister_parents_except(path, "");
    }

    /// Remove `path` from every ancestor's child set, stopping short of
    /// `stop_at` (used while collapsing a directory replaced by a file,
    /// where `stop_at` is the new file's own path and must keep its
    /// freshly (re-)registered entry below it, if any).
    fn unregister_parents_except(&mut self, path: &str, stop_at: &str) {
        for ancestor in ancestors(path) {
            if ancestor == stop_at {
                continue;
            }
            if let Some(children) = self.parents.get_mut(&ancestor) {
                children.remove(path);
                if children.is_empty() {
                    self.parents.remove(&ancestor);
                }
            }
        }
    }

    /// Write the serialized index through the held lock. Rolls back
    /// without writing if nothing changed since load.
    pub fn write_update(mut self) -> Result<UpdateResult, IndexError> {
        let lock = self.lock.take().ok_or(IndexError::NotHeld)?;
        if !self.changed {
            lock.rollback()?;
            return Ok(UpdateResult::NoChange);
        }
        write::write_locked(&self.entries, lock)?;
        Ok(UpdateResult::Written)
    }

    /// Discard the held lock without writing.
    pub fn release(mut self) -> Result<(), IndexError> {
        let lock = self.lock.take().ok_or(IndexError::NotHeld)?;
        lock.rollback()?;
        Ok(())
    }

    /// All entries, sorted lexicographically by path.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Whether `path` is tracked, either as a file entry or as an
    /// ancestor directory of some tracked entry.
    pub fn is_tracked(&self, path: &str) -> bool {
        self.entries.contains_key(path) || self.parents.contains_key(path)
    }

    pub fn index_entries(&self) -> &BTreeMap<String, IndexEntry> {
        &self.entries
    }

    /// Refresh an existing entry's stat fields in place (used by the
    /// workspace scanner's re-hash fast path) and mark the index dirty.
    pub fn update_entry_stat(&mut self, path: &str, stat: &Stat) {
        if let Some(entry) = self.entries.get_mut(path) {
            entry.refresh_stat(stat);
            self.changed = true;
        }
    }
}

/// Every strict ancestor directory of `path`, root-first:
/// `"a/b/c" -> ["a", "a/b"]`.
fn ancestors(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    for (i, b) in path.bytes().enumerate() {
        if b == b'/' {
            out.push(path[..i].to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitgo_object::FileMode;

    fn stat() -> Stat {
        Stat {
            ctime_sec: 0,
            ctime_nsec: 0,
            mtime_sec: 0,
            mtime_nsec: 0,
            dev: 0,
            ino: 0,
            mode: FileMode::Regular,
            uid: 0,
            gid: 0,
            size: 0,
        }
    }

    fn empty_index() -> Index {
        Index {
            path: PathBuf::from("/tmp/does-not-matter"),
            entries: BTreeMap::new(),
            parents: BTreeMap::new(),
            lock: None,
            changed: false,
        }
    }

    #[test]
    fn ancestors_of_nested_path() {
        assert_eq!(ancestors("a/b/c"), vec!["a".to_string(), "a/b".to_string()]);
        assert_eq!(ancestors("a"), Vec::<String>::new());
    }

    #[test]
    fn add_then_tracked() {
        let mut index = empty_index();
        index.add("a/b.txt", ObjectId::NULL, &stat());
        assert!(index.is_tracked("a/b.txt"));
        assert!(index.is_tracked("a"));
        assert!(!index.is_tracked("a/b"));
    }

    #[test]
    fn file_replaces_directory() {
        let mut index = empty_index();
        index.add("a/b/c.txt", ObjectId::NULL, &stat());
        assert!(index.is_tracked("a/b/c.txt"));

        index.add("a/b", ObjectId::NULL, &stat());
        assert!(index.entries.contains_key("a/b"));
        assert!(!index.entries.contains_key("a/b/c.txt"));
        assert!(!index.is_tracked("a/b/c.txt"));
    }

    #[test]
    fn directory_replaces_file() {
        let mut index = empty_index();
        index.add("a/b", ObjectId::NULL, &stat());
        assert!(index.entries.contains_key("a/b"));

        index.add("a/b/c.txt", ObjectId::NULL, &stat());
        assert!(!index.entries.contains_key("a/b"));
        assert!(index.entries.contains_key("a/b/c.txt"));
        assert!(index.is_tracked("a/b"));
    }

    #[test]
    fn entries_iterate_in_sorted_order() {
        let mut index = empty_index();
        index.add("b.txt", ObjectId::NULL, &stat());
        index.add("a.txt", ObjectId::NULL, &stat());
        let paths: Vec<_> = index.entries().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }
}
