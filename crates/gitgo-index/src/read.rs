use std::fs;
use std::path::Path;

use crate::{IndexEntry, IndexError};

const SIGNATURE: &[u8; 4] = b"DIRC";
const VERSION: u32 = 2;

/// Read and validate the index file at `path`. A missing file yields an
/// empty entry list rather than an error.
pub(crate) fn read_entries(path: &Path) -> Result<Vec<IndexEntry>, IndexError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    parse(&data)
}

fn parse(data: &[u8]) -> Result<Vec<IndexEntry>, IndexError> {
    if data.len() < 12 + 20 {
        return Err(IndexError::Truncated);
    }

    let (body, checksum) = data.split_at(data.len() - 20);
    let computed = gitgo_hash::Hasher::digest(body)?;
    if computed.as_bytes().as_slice() != checksum {
        return Err(IndexError::ChecksumMismatch);
    }

    if &body[0..4] != SIGNATURE {
        return Err(IndexError::BadSignature);
    }
    let version = u32::from_be_bytes(body[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(IndexError::UnsupportedVersion(version));
    }
    let count = u32::from_be_bytes(body[8..12].try_into().unwrap()) as usize;

    let mut entries = Vec::with_capacity(count);
    let mut cursor = 12;
    for _ in 0..count {
        let (entry, consumed) = IndexEntry::parse(&body[cursor..])?;
        cursor += consumed;
        entries.push(entry);
    }

    Ok(entries)
}
