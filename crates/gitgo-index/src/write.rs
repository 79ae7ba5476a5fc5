use std::collections::BTreeMap;
use std::io::Write;

use gitgo_utils::lockfile::LockFile;

use crate::{IndexEntry, IndexError};

const SIGNATURE: &[u8; 4] = b"DIRC";
const VERSION: u32 = 2;

/// Serialize `entries` (already in sorted key order) and commit them
/// through the held `lock`.
pub(crate) fn write_locked(
    entries: &BTreeMap<String, IndexEntry>,
    mut lock: LockFile,
) -> Result<(), IndexError> {
    let body = serialize(entries);
    let checksum = gitgo_hash::Hasher::digest(&body)?;

    lock.write_all(&body)?;
    lock.write_all(checksum.as_bytes())?;
    lock.commit()?;
    Ok(())
}

fn serialize(entries: &BTreeMap<String, IndexEntry>) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(SIGNATURE);
    buf.extend_from_slice(&VERSION.to_be_bytes());
    buf.extend_from_slice(&(entries.len() as u32).to_be_bytes());

    for entry in entries.values() {
        buf.extend_from_slice(&entry.serialize());
    }
    buf
}
