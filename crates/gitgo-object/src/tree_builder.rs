//! Packs a flat, already conflict-free list of `(path, oid, mode)` entries
//! into the nested tree structure Git stores on disk.
//!
//! The in-memory shape is a two-variant sum (`Node::Leaf` / `Node::Tree`),
//! not an inheritance hierarchy. Serialization is post-order: every
//! subtree is written out (via the caller-supplied `store` callback)
//! before the directory that contains it, since a tree entry needs its
//! child's oid.

use std::collections::BTreeMap;

use bstr::BString;
use gitgo_hash::ObjectId;

use crate::{FileMode, Tree, TreeEntry};

/// Internal consistency failure: the index is supposed to guarantee no
/// path is ever both a file and a directory, so this should never fire
/// in practice.
#[derive(Debug, thiserror::Error)]
pub enum TreeBuilderError {
    #[error("'{path}' is both a file and a directory")]
    Conflict { path: String },
}

enum Node {
    Leaf { oid: ObjectId, mode: FileMode },
    Tree(BTreeMap<String, Node>),
}

/// Build the tree hierarchy for `entries` and return the root tree's oid.
///
/// `store` is called once per directory level, innermost first, and
/// must return the oid under which that level's serialized tree object
/// was (or already is) stored.
pub fn build_tree<F, E>(entries: &[(String, ObjectId, FileMode)], mut store: F) -> Result<ObjectId, E>
where
    F: FnMut(&Tree) -> Result<ObjectId, E>,
    E: From<TreeBuilderError>,
{
    let mut root: BTreeMap<String, Node> = BTreeMap::new();
    for (path, oid, mode) in entries {
        insert(&mut root, path, *oid, *mode)?;
    }
    serialize(&root, &mut store)
}

fn insert(
    node: &mut BTreeMap<String, Node>,
    path: &str,
    oid: ObjectId,
    mode: FileMode,
) -> Result<(), TreeBuilderError> {
    match path.split_once('/') {
        None => {
            node.insert(path.to_string(), Node::Leaf { oid, mode });
            Ok(())
        }
        Some((head, rest)) => {
            let child = node
                .entry(head.to_string())
                .or_insert_with(|| Node::Tree(BTreeMap::new()));
            match child {
                Node::Tree(children) => insert(children, rest, oid, mode),
                Node::Leaf { .. } => Err(TreeBuilderError::Conflict {
                    path: path.to_string(),
                }),
            }
        }
    }
}

fn serialize<F, E>(node: &BTreeMap<String, Node>, store: &mut F) -> Result<ObjectId, E>
where
    F: FnMut(&Tree) -> Result<ObjectId, E>,
    E: From<TreeBuilderError>,
{
    let mut tree = Tree::new();
    for (name, child) in node {
        let (mode, oid) = match child {
            Node::Leaf { oid, mode } => (*mode, *oid),
            Node::Tree(children) => (FileMode::Tree, serialize(children, store)?),
        };
        tree.entries.push(TreeEntry {
            mode,
            name: BString::from(name.as_str()),
            oid,
        });
    }
    store(&tree)
}
