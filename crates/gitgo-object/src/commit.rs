use bstr::{BStr, BString, ByteSlice};
use gitgo_hash::ObjectId;
use gitgo_utils::date::Signature;

use crate::ObjectError;

/// A commit object: a tree snapshot, an optional parent, and two signatures.
///
/// The committer header is written with the historical spelling
/// `comitter`, preserved for compatibility with prior output of this
/// engine; both spellings are accepted on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// OID of the root tree.
    pub tree: ObjectId,
    /// The previous head commit, if any (`None` for a root commit).
    pub parent: Option<ObjectId>,
    /// Author identity and timestamp.
    pub author: Signature,
    /// Committer identity and timestamp.
    pub committer: Signature,
    /// Commit message (everything after the blank line separator).
    pub message: BString,
}

impl Commit {
    /// Parse commit content from raw bytes (no object header).
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parent: Option<ObjectId> = None;
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;

        let mut pos = 0;
        let data = content;

        loop {
            if pos >= data.len() || data[pos] == b'\n' {
                if pos < data.len() {
                    pos += 1;
                }
                break;
            }

            let line_end = data[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| p + pos)
                .unwrap_or(data.len());
            let line = &data[pos..line_end];

            if let Some(space_pos) = line.iter().position(|&b| b == b' ') {
                let key = &line[..space_pos];
                let value = &line[space_pos + 1..];
                match key {
                    b"tree" => {
                        let hex = std::str::from_utf8(value)
                            .map_err(|_| ObjectError::InvalidHeader("non-UTF8 tree OID".into()))?;
                        tree = Some(ObjectId::from_hex(hex)?);
                    }
                    b"parent" => {
                        let hex = std::str::from_utf8(value).map_err(|_| {
                            ObjectError::InvalidHeader("non-UTF8 parent OID".into())
                        })?;
                        parent = Some(ObjectId::from_hex(hex)?);
                    }
                    b"author" => author = Some(parse_signature(value)?),
                    b"committer" | b"comitter" => committer = Some(parse_signature(value)?),
                    _ => {}
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer =
            committer.ok_or(ObjectError::MissingCommitField { field: "comitter" })?;
        let message = BString::from(&data[pos..]);

        Ok(Self {
            tree,
            parent,
            author,
            committer,
            message,
        })
    }

    /// Serialize commit content to bytes (no object header).
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        if let Some(parent) = &self.parent {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"comitter ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    /// Is this a root commit? (no parent)
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Get just the summary (first line) of the message.
    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }
}

fn parse_signature(data: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(data)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}
