//! The workspace scanner: classifies working-tree paths against the
//! index as modified, deleted, or untracked.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use gitgo_hash::Hasher;
use gitgo_index::{Index, Stat};

/// Errors from scanning the working tree.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    Index(#[from] gitgo_index::IndexError),

    #[error(transparent)]
    Hash(#[from] gitgo_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The three sorted output groups.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Status {
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

impl Status {
    pub fn is_clean(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty() && self.untracked.is_empty()
    }

    /// Render `" M <path>"` / `" D <path>"` / `"?? <path>"` lines, each
    /// followed by `\n`, modified group first then deleted then untracked.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for path in &self.modified {
            out.push_str(" M ");
            out.push_str(path);
            out.push('\n');
        }
        for path in &self.deleted {
            out.push_str(" D ");
            out.push_str(path);
            out.push('\n');
        }
        for path in &self.untracked {
            out.push_str("?? ");
            out.push_str(path);
            out.push('\n');
        }
        out
    }
}

/// Scan the working tree rooted at `root` against `index`.
///
/// Stat-only drift on unchanged files is refreshed on `index` in place;
/// the caller must still call `index.write_update()` afterward (a
/// no-op if the scan found nothing to refresh).
pub fn scan(index: &mut Index, root: &Path) -> Result<Status, StatusError> {
    let mut stats: BTreeMap<String, Stat> = BTreeMap::new();
    let mut untracked: BTreeSet<String> = BTreeSet::new();

    walk(index, root, root, &mut stats, &mut untracked)?;

    let mut modified = Vec::new();
    let mut deleted = Vec::new();

    let paths: Vec<String> = index.entries().map(|e| e.path.clone()).collect();
    for path in paths {
        let Some(stat) = stats.get(&path) else {
            deleted.push(path);
            continue;
        };

        let (mode, size, ctime_sec, ctime_nsec, mtime_sec, mtime_nsec, oid) = {
            let entry = index
                .index_entries()
                .get(&path)
                .expect("path was just read from this index");
            (
                entry.mode,
                entry.size,
                entry.ctime_sec,
                entry.ctime_nsec,
                entry.mtime_sec,
                entry.mtime_nsec,
                entry.oid,
            )
        };

        if mode != stat.mode || size != stat.size {
            modified.push(path);
            continue;
        }
        if ctime_sec == stat.ctime_sec
            && ctime_nsec == stat.ctime_nsec
            && mtime_sec == stat.mtime_sec
            && mtime_nsec == stat.mtime_nsec
        {
            continue;
        }

        let content = fs::read(root.join(&path))?;
        let rehashed = Hasher::hash_object("blob", &content)?;
        if rehashed == oid {
            index.update_entry_stat(&path, stat);
        } else {
            modified.push(path);
        }
    }

    Ok(Status {
        modified,
        deleted,
        untracked: untracked.into_iter().collect(),
    })
}

fn is_special_name(name: &str) -> bool {
    name == "." || name == ".." || name == ".gitgo"
}

fn relative(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk(
    index: &Index,
    base: &Path,
    dir: &Path,
    stats: &mut BTreeMap<String, Stat>,
    untracked: &mut BTreeSet<String>,
) -> Result<(), StatusError> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, std::io::Error>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_special_name(&name) {
            continue;
        }

        let path = entry.path();
        let rel = relative(base, &path);
        let meta = entry.metadata()?;

        if meta.is_dir() {
            if index.is_tracked(&rel) {
                walk(index, base, &path, stats, untracked)?;
            } else if is_trackable(index, base, &path)? {
                untracked.insert(format!("{rel}/"));
            }
        } else if index.is_tracked(&rel) {
            stats.insert(rel, Stat::from_metadata(&meta));
        } else {
            untracked.insert(rel);
        }
    }

    Ok(())
}

/// A path is trackable if it eventually contains a file not already in
/// the index. Files are examined before subdirectories; an empty
/// directory is never trackable.
fn is_trackable(index: &Index, base: &Path, path: &Path) -> Result<bool, StatusError> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_file() {
        let rel = relative(base, path);
        return Ok(!index.is_tracked(&rel));
    }

    let mut entries: Vec<_> = fs::read_dir(path)?
        .collect::<Result<Vec<_>, std::io::Error>>()?
        .into_iter()
        .filter(|e| !is_special_name(&e.file_name().to_string_lossy()))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    if entries.is_empty() {
        return Ok(false);
    }

    for entry in &entries {
        if entry.file_type()?.is_file() && is_trackable(index, base, &entry.path())? {
            return Ok(true);
        }
    }
    for entry in &entries {
        if entry.file_type()?.is_dir() && is_trackable(index, base, &entry.path())? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitgo_hash::ObjectId;
    use gitgo_object::FileMode;
    use std::os::unix::fs::PermissionsExt;

    fn write_and_add(index: &mut Index, root: &Path, rel: &str, content: &[u8]) {
        let full = root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();
        let meta = fs::metadata(&full).unwrap();
        let oid = Hasher::hash_object("blob", content).unwrap();
        index.add(rel, oid, &Stat::from_metadata(&meta));
    }

    #[test]
    fn untracked_nested_directory_collapses() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        fs::create_dir_all(dir.path().join("outer/inner")).unwrap();
        fs::write(dir.path().join("outer/inner/file.txt"), b"hi").unwrap();

        let status = scan(&mut index, dir.path()).unwrap();
        assert_eq!(status.untracked, vec!["outer/".to_string()]);
        assert!(status.modified.is_empty());
        assert!(status.deleted.is_empty());
    }

    #[test]
    fn empty_directory_is_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        fs::create_dir_all(dir.path().join("outer")).unwrap();

        let status = scan(&mut index, dir.path()).unwrap();
        assert!(status.is_clean());
    }

    #[test]
    fn deleted_file_detected() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        write_and_add(&mut index, dir.path(), "a.txt", b"hello");
        fs::remove_file(dir.path().join("a.txt")).unwrap();

        let status = scan(&mut index, dir.path()).unwrap();
        assert_eq!(status.deleted, vec!["a.txt".to_string()]);
    }

    #[test]
    fn mode_change_is_modified() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        write_and_add(&mut index, dir.path(), "run.sh", b"x");

        let mut perms = fs::metadata(dir.path().join("run.sh")).unwrap().permissions();
        perms.set_mode(0o644);
        fs::set_permissions(dir.path().join("run.sh"), perms).unwrap();

        let status = scan(&mut index, dir.path()).unwrap();
        assert_eq!(status.modified, vec!["run.sh".to_string()]);
    }

    #[test]
    fn content_change_detected_via_rehash() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        write_and_add(&mut index, dir.path(), "a.txt", b"hello");

        // Overwrite with different content but keep the same size so the
        // fast path can't short-circuit; force a ctime/mtime change too.
        fs::write(dir.path().join("a.txt"), b"olleh").unwrap();

        let status = scan(&mut index, dir.path()).unwrap();
        assert_eq!(status.modified, vec!["a.txt".to_string()]);
    }

    #[test]
    fn unchanged_file_after_touch_is_clean_and_refreshes_stat() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = Index::load(dir.path().join("index")).unwrap();
        write_and_add(&mut index, dir.path(), "a.txt", b"hello");

        // Simulate a touch: same content, stale recorded stat forces a re-hash.
        let entry = index.index_entries().get("a.txt").unwrap().clone();
        let stale = Stat {
            ctime_sec: entry.ctime_sec.wrapping_add(1),
            ctime_nsec: entry.ctime_nsec,
            mtime_sec: entry.mtime_sec,
            mtime_nsec: entry.mtime_nsec,
            dev: entry.dev,
            ino: entry.ino,
            mode: entry.mode,
            uid: entry.uid,
            gid: entry.gid,
            size: entry.size,
        };
        index.update_entry_stat("a.txt", &stale);

        let status = scan(&mut index, dir.path()).unwrap();
        assert!(status.is_clean());
    }

    #[test]
    fn file_mode_predicate_used_for_executable_detection() {
        assert_eq!(FileMode::Executable.raw(), 0o100755);
        let _ = ObjectId::NULL;
    }
}
