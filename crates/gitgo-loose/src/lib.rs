//! Loose object storage: read and write zlib-compressed objects.
//!
//! Each object lives at `.gitgo/objects/XX/YYYY...` where `XX` is the first
//! byte of the OID in hex and `YYYY...` is the rest. The file content is
//! zlib-compressed `"<type> <size>\0<content>"`.

mod read;
mod write;

use gitgo_hash::ObjectId;
use std::path::{Path, PathBuf};

/// Interface to the loose object directory (`.gitgo/objects/`).
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression_level: flate2::Compression,
}

impl LooseObjectStore {
    /// Open the loose object store at the given path. Does not require the
    /// directory to exist yet; it is created lazily on first write.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression_level: flate2::Compression::default(),
        }
    }

    /// Set the zlib compression level (0–9).
    pub fn set_compression_level(&mut self, level: u32) {
        self.compression_level = flate2::Compression::new(level);
    }

    /// The file path at which an object with this OID would be stored.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        let (dir, rest) = oid.shard();
        self.objects_dir.join(dir).join(rest)
    }
}

/// Errors from loose object operations.
#[derive(Debug, thiserror::Error)]
pub enum LooseError {
    #[error("corrupt loose object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("hash mismatch for {path}: expected {expected}, got {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("object parse error: {0}")]
    Object(#[from] gitgo_object::ObjectError),

    #[error("hash error: {0}")]
    Hash(#[from] gitgo_hash::HashError),
}
