use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use gitgo_index::{Index, Stat};
use gitgo_object::ObjectType;
use gitgo_repository::Repository;

#[derive(Args)]
pub struct AddArgs {
    /// Files or directories to add
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &AddArgs, repo: &Repository) -> Result<i32> {
    let root = repo.root().to_path_buf();

    let mut files = Vec::new();
    for path in &args.paths {
        let full = root.join(path);
        if !full.exists() {
            bail!("pathspec '{}' did not match any files", path.display());
        }
        collect_files(&root, &full, &mut files)?;
    }

    let Some(mut index) = Index::hold_for_update(repo.index_path())? else {
        let lock_path = repo.index_path().with_extension("lock");
        eprintln!(
            "fatal: Unable to create '{}': File exists.\n\n\
             Another gitgo process seems to be running in this repository.\n\
             If it still fails, a gitgo process may have crashed and left a stale\n\
             lock file; remove the file manually to continue:\n\n\
             \trm '{}'",
            lock_path.display(),
            lock_path.display(),
        );
        return Ok(1);
    };

    for rel in &files {
        let full = root.join(rel);
        let content = fs::read(&full)?;
        let oid = repo.odb().write_raw(ObjectType::Blob, &content)?;
        let metadata = fs::symlink_metadata(&full)?;
        let stat = Stat::from_metadata(&metadata);
        index.add(rel, oid, &stat);
    }

    index.write_update()?;
    Ok(0)
}

/// Resolve `path` (a file or directory) into a list of root-relative file
/// paths, skipping `.gitgo`.
fn collect_files(root: &Path, path: &Path, out: &mut Vec<String>) -> Result<()> {
    if path.is_dir() {
        let mut entries: Vec<_> = fs::read_dir(path)?.collect::<Result<_, std::io::Error>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let name = entry.file_name();
            if name == "." || name == ".." || name == ".gitgo" {
                continue;
            }
            collect_files(root, &entry.path(), out)?;
        }
        return Ok(());
    }

    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    out.push(rel);
    Ok(())
}
