use std::io::Read;

use anyhow::{bail, Result};
use bstr::BString;
use gitgo_object::{build_tree, Commit, FileMode, Object};
use gitgo_repository::Repository;
use gitgo_utils::date::{GitDate, Signature};

pub fn run(repo: &Repository) -> Result<i32> {
    let mut message = Vec::new();
    std::io::stdin().read_to_end(&mut message)?;
    if message.is_empty() {
        bail!("commit message must not be empty");
    }

    let index = gitgo_index::Index::load(repo.index_path())?;
    let entries: Vec<(String, gitgo_hash::ObjectId, FileMode)> = index
        .entries()
        .map(|e| (e.path.clone(), e.oid, e.mode))
        .collect();

    let odb = repo.odb();
    let tree = build_tree(&entries, |tree| -> Result<gitgo_hash::ObjectId> {
        Ok(odb.write(&Object::Tree(tree.clone()))?)
    })?;

    let parent = repo.head_oid()?;
    let is_root = parent.is_none();

    let signature = Signature {
        name: BString::from(std::env::var("GITGO_AUTHOR_NAME").unwrap_or_default()),
        email: BString::from(std::env::var("GITGO_AUTHOR_EMAIL").unwrap_or_default()),
        date: GitDate::now(),
    };

    let commit = Commit {
        tree,
        parent,
        author: signature.clone(),
        committer: signature,
        message: BString::from(message),
    };

    let commit_oid = odb.write(&Object::Commit(commit.clone()))?;
    repo.refs().update_head(commit_oid)?;

    let prefix = if is_root { "(root-commit) " } else { "" };
    println!("{prefix}{} {}", commit_oid.to_hex(), commit.summary());

    Ok(0)
}
