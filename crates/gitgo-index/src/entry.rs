//! Index entry types: `IndexEntry` and the filesystem `Stat` it is built from.

use gitgo_hash::ObjectId;
use gitgo_object::FileMode;

use crate::IndexError;

/// Filesystem metadata captured for a staged file, truncated to the
/// 32-bit fields the on-disk entry format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub ctime_sec: u32,
    pub ctime_nsec: u32,
    pub mtime_sec: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl Stat {
    /// Build from a `std::fs::Metadata`, truncating 64-bit fields to u32.
    #[cfg(unix)]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;

        let executable = meta.permissions().mode() & 0o111 != 0;
        Self {
            ctime_sec: meta.ctime() as u32,
            ctime_nsec: meta.ctime_nsec() as u32,
            mtime_sec: meta.mtime() as u32,
            mtime_nsec: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            mode: if executable {
                FileMode::Executable
            } else {
                FileMode::Regular
            },
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.size() as u32,
        }
    }
}

/// One entry in the index: a tracked path plus the blob it points at and
/// the filesystem stat used for fast change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub path: String,
    pub oid: ObjectId,
    pub ctime_sec: u32,
    pub ctime_nsec: u32,
    pub mtime_sec: u32,
    pub mtime_nsec: u32,
    pub dev: u32,
    pub ino: u32,
    pub mode: FileMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

const FLAGS_PATH_LEN_MASK: usize = 0xFFF;

impl IndexEntry {
    pub fn new(path: impl Into<String>, oid: ObjectId, stat: &Stat) -> Self {
        Self {
            path: path.into(),
            oid,
            ctime_sec: stat.ctime_sec,
            ctime_nsec: stat.ctime_nsec,
            mtime_sec: stat.mtime_sec,
            mtime_nsec: stat.mtime_nsec,
            dev: stat.dev,
            ino: stat.ino,
            mode: stat.mode,
            uid: stat.uid,
            gid: stat.gid,
            size: stat.size,
        }
    }

    /// Overwrite the stat fields in place, leaving `path`/`oid`/`mode` untouched.
    pub fn refresh_stat(&mut self, stat: &Stat) {
        self.ctime_sec = stat.ctime_sec;
        self.ctime_nsec = stat.ctime_nsec;
        self.mtime_sec = stat.mtime_sec;
        self.mtime_nsec = stat.mtime_nsec;
        self.dev = stat.dev;
        self.ino = stat.ino;
        self.uid = stat.uid;
        self.gid = stat.gid;
        self.size = stat.size;
    }

    fn flags(&self) -> u16 {
        self.path.len().min(FLAGS_PATH_LEN_MASK) as u16
    }

    /// Serialize to the on-disk entry form: 62 fixed bytes, the path,
    /// a NUL terminator, and NUL padding out to a multiple of 8 bytes.
    pub(crate) fn serialize(&self) -> Vec<u8> {
        let path_bytes = self.path.as_bytes();
        let mut buf = Vec::with_capacity(62 + path_bytes.len() + 8);

        buf.extend_from_slice(&self.ctime_sec.to_be_bytes());
        buf.extend_from_slice(&self.ctime_nsec.to_be_bytes());
        buf.extend_from_slice(&self.mtime_sec.to_be_bytes());
        buf.extend_from_slice(&self.mtime_nsec.to_be_bytes());
        buf.extend_from_slice(&self.dev.to_be_bytes());
        buf.extend_from_slice(&self.ino.to_be_bytes());
        buf.extend_from_slice(&self.mode.raw().to_be_bytes());
        buf.extend_from_slice(&self.uid.to_be_bytes());
        buf.extend_from_slice(&self.gid.to_be_bytes());
        buf.extend_from_slice(&self.size.to_be_bytes());
        buf.extend_from_slice(self.oid.as_bytes());
        buf.extend_from_slice(&self.flags().to_be_bytes());
        buf.extend_from_slice(path_bytes);
        buf.push(0);

        let padding = (8 - (buf.len() % 8)) % 8;
        buf.extend(std::iter::repeat(0u8).take(padding));
        buf
    }

    /// Parse one entry from `data`, which must hold at least the full
    /// padded entry. Returns the entry and the number of bytes consumed
    /// (always a multiple of 8).
    pub(crate) fn parse(data: &[u8]) -> Result<(Self, usize), IndexError> {
        if data.len() < 64 {
            return Err(IndexError::Truncated);
        }

        let u32_at =
            |off: usize| -> u32 { u32::from_be_bytes(data[off..off + 4].try_into().unwrap()) };

        let ctime_sec = u32_at(0);
        let ctime_nsec = u32_at(4);
        let mtime_sec = u32_at(8);
        let mtime_nsec = u32_at(12);
        let dev = u32_at(16);
        let ino = u32_at(20);
        let mode_raw = u32_at(24);
        let uid = u32_at(28);
        let gid = u32_at(32);
        let size = u32_at(36);
        let oid = ObjectId::from_bytes(&data[40..60])?;
        // flags at [60..62] are re-derived on every write from path length.

        let mode = FileMode::from_raw(mode_raw).map_err(|_| IndexError::BadMode(mode_raw))?;

        let name_start = 62;
        let mut end = name_start;
        loop {
            if end >= data.len() {
                return Err(IndexError::Truncated);
            }
            if data[end] == 0 {
                break;
            }
            end += 1;
        }
        let path = String::from_utf8(data[name_start..end].to_vec())
            .map_err(|_| IndexError::BadPathEncoding)?;

        let mut consumed = end + 1;
        while consumed % 8 != 0 {
            consumed += 1;
        }
        if consumed > data.len() {
            return Err(IndexError::Truncated);
        }

        Ok((
            Self {
                path,
                oid,
                ctime_sec,
                ctime_nsec,
                mtime_sec,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            consumed,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stat() -> Stat {
        Stat {
            ctime_sec: 1,
            ctime_nsec: 2,
            mtime_sec: 3,
            mtime_nsec: 4,
            dev: 5,
            ino: 6,
            mode: FileMode::Regular,
            uid: 7,
            gid: 8,
            size: 9,
        }
    }

    #[test]
    fn serialize_len_is_multiple_of_eight() {
        let entry = IndexEntry::new("a.txt", ObjectId::NULL, &sample_stat());
        assert_eq!(entry.serialize().len() % 8, 0);
    }

    #[test]
    fn serialize_parse_roundtrip() {
        let entry = IndexEntry::new("src/main.rs", ObjectId::NULL, &sample_stat());
        let bytes = entry.serialize();
        let (parsed, consumed) = IndexEntry::parse(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(parsed, entry);
    }

    #[test]
    fn long_path_does_not_truncate() {
        let long_path = "a/".repeat(3000) + "file.txt";
        let entry = IndexEntry::new(long_path.clone(), ObjectId::NULL, &sample_stat());
        let bytes = entry.serialize();
        let (parsed, _) = IndexEntry::parse(&bytes).unwrap();
        assert_eq!(parsed.path, long_path);
        assert_eq!(entry.flags(), 0xFFF);
    }

    #[test]
    fn executable_mode_roundtrips() {
        let mut stat = sample_stat();
        stat.mode = FileMode::Executable;
        let entry = IndexEntry::new("run.sh", ObjectId::NULL, &stat);
        let bytes = entry.serialize();
        let (parsed, _) = IndexEntry::parse(&bytes).unwrap();
        assert_eq!(parsed.mode, FileMode::Executable);
    }
}
