//! End-to-end scenarios driving the repository subsystems directly,
//! the way a command handler would, without going through the compiled
//! binary.

use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use bstr::BString;
use gitgo_index::{Index, Stat};
use gitgo_object::{build_tree, Commit, FileMode, Object};
use gitgo_repository::Repository;
use gitgo_utils::date::{GitDate, Signature};

fn signature(name: &str, email: &str) -> Signature {
    Signature {
        name: BString::from(name),
        email: BString::from(email),
        date: GitDate::new(1_700_000_000, 0),
    }
}

/// Stage every file under `repo.root()` and return the held index so the
/// caller can finish the write.
fn add_all(repo: &Repository) -> Index {
    let mut index = Index::hold_for_update(repo.index_path()).unwrap().unwrap();
    let mut files = Vec::new();
    collect(repo.root(), repo.root(), &mut files);
    for rel in files {
        let full = repo.root().join(&rel);
        let content = fs::read(&full).unwrap();
        let oid = repo.odb().write_raw(gitgo_object::ObjectType::Blob, &content).unwrap();
        let meta = fs::symlink_metadata(&full).unwrap();
        index.add(&rel, oid, &Stat::from_metadata(&meta));
    }
    index
}

fn collect(root: &std::path::Path, dir: &std::path::Path, out: &mut Vec<String>) {
    let mut entries: Vec<_> = fs::read_dir(dir).unwrap().map(|e| e.unwrap()).collect();
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let name = entry.file_name();
        if name == ".gitgo" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let rel = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.push(rel);
        }
    }
}

fn commit_index(repo: &Repository, message: &str) -> gitgo_hash::ObjectId {
    let index = Index::load(repo.index_path()).unwrap();
    let entries: Vec<(String, gitgo_hash::ObjectId, FileMode)> = index
        .entries()
        .map(|e| (e.path.clone(), e.oid, e.mode))
        .collect();

    let odb = repo.odb();
    let tree = build_tree(&entries, |tree| -> Result<gitgo_hash::ObjectId, gitgo_loose::LooseError> {
        odb.write(&Object::Tree(tree.clone()))
    })
    .unwrap();

    let parent = repo.head_oid().unwrap();
    let sig = signature("A", "a@x");
    let commit = Commit {
        tree,
        parent,
        author: sig.clone(),
        committer: sig,
        message: BString::from(message),
    };
    let oid = odb.write(&Object::Commit(commit)).unwrap();
    repo.refs().update_head(oid).unwrap();
    oid
}

#[test]
fn init_add_commit_produces_known_blob_oid_and_head() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::write(dir.path().join("hello.txt"), b"hello").unwrap();

    let mut index = add_all(&repo);
    let result = index.write_update().unwrap();
    assert_eq!(result, gitgo_index::UpdateResult::Written);

    let oid = repo.odb().write_raw(gitgo_object::ObjectType::Blob, b"hello").unwrap();
    assert_eq!(oid.to_hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");

    let commit_oid = commit_index(&repo, "first\n");

    let head = repo.head_oid().unwrap().unwrap();
    assert_eq!(head, commit_oid);
    assert_eq!(head.to_hex().len(), 40);

    let raw_head = fs::read_to_string(repo.head_path()).unwrap();
    assert_eq!(raw_head, format!("{}\n", commit_oid.to_hex()));
}

#[test]
#[cfg(unix)]
fn executable_bit_is_tracked_and_chmod_is_reported_modified() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let script = dir.path().join("run.sh");
    fs::write(&script, b"x").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let mut index = add_all(&repo);
    index.write_update().unwrap();

    let loaded = Index::load(repo.index_path()).unwrap();
    let entry = loaded.index_entries().get("run.sh").unwrap();
    assert_eq!(entry.mode, FileMode::Executable);

    fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

    let mut index = Index::hold_for_update(repo.index_path()).unwrap().unwrap();
    let status = gitgo_status::scan(&mut index, repo.root()).unwrap();
    assert_eq!(status.modified, vec!["run.sh".to_string()]);
    assert_eq!(status.render(), " M run.sh\n");
}

#[test]
fn untracked_directory_collapses_to_single_line() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::create_dir_all(dir.path().join("outer/inner")).unwrap();
    fs::write(dir.path().join("outer/inner/file.txt"), b"hi").unwrap();

    let mut index = Index::hold_for_update(repo.index_path()).unwrap().unwrap();
    let status = gitgo_status::scan(&mut index, repo.root()).unwrap();
    assert_eq!(status.render(), "?? outer/\n");
}

#[test]
fn empty_directory_produces_no_status_output() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::create_dir_all(dir.path().join("outer")).unwrap();

    let mut index = Index::hold_for_update(repo.index_path()).unwrap().unwrap();
    let status = gitgo_status::scan(&mut index, repo.root()).unwrap();
    assert_eq!(status.render(), "");
}

#[test]
fn deleted_directory_reports_each_descendant_file() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::create_dir_all(dir.path().join("a/b")).unwrap();
    fs::write(dir.path().join("a/2.txt"), b"two").unwrap();
    fs::write(dir.path().join("a/b/3.txt"), b"three").unwrap();

    let mut index = add_all(&repo);
    index.write_update().unwrap();
    commit_index(&repo, "add a\n");

    fs::remove_dir_all(dir.path().join("a")).unwrap();

    let mut index = Index::hold_for_update(repo.index_path()).unwrap().unwrap();
    let status = gitgo_status::scan(&mut index, repo.root()).unwrap();
    assert_eq!(status.render(), " D a/2.txt\n D a/b/3.txt\n");
}

#[test]
fn concurrent_add_is_rejected_without_touching_the_index() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    fs::write(dir.path().join("any.txt"), b"content").unwrap();

    let lock_path = repo.index_path().with_extension("lock");
    fs::write(&lock_path, b"").unwrap();

    let held = Index::hold_for_update(repo.index_path()).unwrap();
    assert!(held.is_none());
    assert!(!repo.index_path().exists());

    let blobs_before: Vec<_> = walk_objects(repo.objects_dir());
    assert!(blobs_before.is_empty());
}

fn walk_objects(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.extend(walk_objects(&path));
            } else {
                out.push(path);
            }
        }
    }
    out
}
