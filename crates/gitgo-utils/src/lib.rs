//! Shared low-level utilities: dates/signatures, lock files, and the
//! crate-wide error type these build on.

pub mod date;
pub mod error;
pub mod lockfile;

pub use bstr::{BStr, BString, ByteSlice, ByteVec};
pub use error::{LockError, UtilError};

pub type Result<T> = std::result::Result<T, UtilError>;
