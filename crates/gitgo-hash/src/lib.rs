//! Object identifiers and hashing for gitgo.
//!
//! Every stored object is named by the SHA-1 of its canonical
//! `"<type> <len>\0<payload>"` form. This crate owns that computation
//! and the [`ObjectId`] type that carries the result around the rest
//! of the workspace.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
