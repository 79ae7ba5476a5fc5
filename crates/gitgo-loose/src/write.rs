use std::fs;
use std::io::Write;
use std::path::Path;

use flate2::write::ZlibEncoder;
use gitgo_hash::{Hasher, ObjectId};
use gitgo_object::header;
use gitgo_object::{Object, ObjectType};

use crate::{LooseError, LooseObjectStore};

impl LooseObjectStore {
    /// Write an object to the loose store. Returns the OID.
    ///
    /// No-op if the object already exists (idempotent). The file is written
    /// atomically (temp file + rename).
    pub fn write(&self, obj: &Object) -> Result<ObjectId, LooseError> {
        let content = obj.serialize_content();
        self.write_raw(obj.object_type(), &content)
    }

    /// Write raw bytes with a known type. Returns the OID.
    ///
    /// No-op if the object already exists (idempotent).
    pub fn write_raw(&self, obj_type: ObjectType, content: &[u8]) -> Result<ObjectId, LooseError> {
        let type_str = std::str::from_utf8(obj_type.as_bytes()).expect("ascii object type");
        let oid = Hasher::hash_object(type_str, content)?;

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let hdr = header::write_header(obj_type, content.len());
        let tmp_path = write_to_temp(&self.objects_dir, &hdr, content, self.compression_level)?;

        finalize_object(&tmp_path, &final_path)?;

        Ok(oid)
    }
}

/// Compress header + content into a uniquely-named temp file inside
/// `objects_dir`, so the later rename onto the final path stays on the
/// same filesystem.
fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    content: &[u8],
    level: flate2::Compression,
) -> Result<std::path::PathBuf, LooseError> {
    fs::create_dir_all(objects_dir)?;

    let suffix = std::process::id()
        ^ std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
    let tmp_path = objects_dir.join(format!(".temp-obj-{suffix}"));

    let file = fs::File::create(&tmp_path)?;
    let mut encoder = ZlibEncoder::new(file, level);
    encoder.write_all(hdr)?;
    encoder.write_all(content)?;
    encoder.finish()?;

    Ok(tmp_path)
}

/// Atomically move a temp file to its final destination.
///
/// If the destination already exists (a race with another writer storing
/// the same content), the temp file is removed and the write is treated as
/// successful — the content is already there under its own hash.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), LooseError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(LooseError::Io(e))
        }
    }
}
