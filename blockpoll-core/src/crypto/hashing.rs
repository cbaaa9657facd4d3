//! SHA-256 hashing utilities.

use sha2::{Digest, Sha256};

use crate::hash::Hash;

/// Compute SHA-256 hash of the input data.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
