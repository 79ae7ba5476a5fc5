use std::fs;
use std::io::Read;

use flate2::read::ZlibDecoder;
use gitgo_hash::ObjectId;
use gitgo_object::{header, Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    /// Check if a loose object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read and parse a loose object by OID.
    ///
    /// Returns `Ok(None)` if the object does not exist, `Err` if it exists
    /// but is corrupt or its content no longer hashes to `oid`.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, LooseError> {
        let Some((_obj_type, content)) = self.read_raw(oid)? else {
            return Ok(None);
        };
        Ok(Some(Object::parse(&content)?))
    }

    /// Read a loose object's type and decompressed payload, without parsing
    /// the payload into a typed object.
    ///
    /// Returns `Ok(None)` if the object does not exist, `Err` if it exists
    /// but is corrupt or its content no longer hashes to `oid`.
    pub fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, LooseError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LooseError::Io(e)),
        };

        let decompressed = decompress_all(&compressed, oid)?;

        let actual_oid = gitgo_hash::Hasher::digest(&decompressed)?;
        if actual_oid != *oid {
            return Err(LooseError::HashMismatch {
                path,
                expected: oid.to_hex(),
                actual: actual_oid.to_hex(),
            });
        }

        let (obj_type, content_size, header_len) = header::parse_header(&decompressed)?;
        let payload = &decompressed[header_len..];
        if payload.len() != content_size {
            return Err(LooseError::Corrupt {
                oid: oid.to_hex(),
                reason: format!(
                    "declared size {} does not match payload length {}",
                    content_size,
                    payload.len()
                ),
            });
        }

        Ok(Some((obj_type, payload.to_vec())))
    }
}

/// Zlib-decompress the full contents of a loose object file.
fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, LooseError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| LooseError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    Ok(decompressed)
}
