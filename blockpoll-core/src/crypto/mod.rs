//! Cryptographic primitives.
//!
//! Only SHA-256 is needed: block identity hashes are SHA-256 digests of the
//! encoded block header.

mod hashing;

pub use hashing::sha256;
