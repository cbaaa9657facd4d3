//! Block identity hashes.

/// A 32-byte block identity hash.
pub type Hash = [u8; 32];

/// The null hash. As a get-blocks stop hash it means "no stop".
pub const NULL_HASH: Hash = [0u8; 32];

/// Render a hash as lowercase hex.
pub fn encode_hash(hash: &Hash) -> String {
    hex::encode(hash)
}
