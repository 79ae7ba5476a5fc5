use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::HashError;

/// A SHA-1 object identifier — the hash of a stored object's canonical bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// The all-zeros OID, used to represent an absent/empty head pointer.
    pub const NULL: Self = Self([0u8; 20]);

    /// Wrap 20 raw digest bytes as an `ObjectId`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != 20 {
            return Err(HashError::InvalidHashLength {
                expected: 20,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a 40-character hex string into an `ObjectId`.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        if hex.len() != 40 {
            return Err(HashError::InvalidHexLength {
                expected: 40,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; 20];
        hex_decode(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the all-zeros OID.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Lowercase 40-character hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.0)
    }

    /// The loose-object path components: `("xx", "remaining 38 hex chars")`.
    pub fn shard(&self) -> (String, String) {
        let hex = self.to_hex();
        (hex[..2].to_string(), hex[2..].to_string())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_BLOB_SHA1: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";

    #[test]
    fn from_hex_roundtrip() {
        let oid = ObjectId::from_hex(EMPTY_BLOB_SHA1).unwrap();
        assert_eq!(oid.to_string(), EMPTY_BLOB_SHA1);
    }

    #[test]
    fn from_bytes_roundtrip() {
        let oid = ObjectId::from_hex(EMPTY_BLOB_SHA1).unwrap();
        let again = ObjectId::from_bytes(oid.as_bytes().as_slice()).unwrap();
        assert_eq!(oid, again);
    }

    #[test]
    fn rejects_wrong_hex_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert!(matches!(err, HashError::InvalidHexLength { .. }));
    }

    #[test]
    fn rejects_wrong_byte_length() {
        let err = ObjectId::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, HashError::InvalidHashLength { .. }));
    }

    #[test]
    fn null_oid() {
        assert!(ObjectId::NULL.is_null());
        let oid = ObjectId::from_hex(EMPTY_BLOB_SHA1).unwrap();
        assert!(!oid.is_null());
    }

    #[test]
    fn shard_splits_first_two_hex_chars() {
        let oid = ObjectId::from_hex(EMPTY_BLOB_SHA1).unwrap();
        let (dir, rest) = oid.shard();
        assert_eq!(dir, "e6");
        assert_eq!(rest, "9de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert_eq!(format!("{dir}{rest}"), EMPTY_BLOB_SHA1);
    }

    #[test]
    fn ordering_matches_hex_ordering() {
        let a = ObjectId::from_hex("0000000000000000000000000000000000000001").unwrap();
        let b = ObjectId::from_hex("0000000000000000000000000000000000000002").unwrap();
        assert!(a < b);
    }
}
