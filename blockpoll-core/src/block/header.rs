//! Block header structure.

use serde::{Deserialize, Serialize};

use crate::crypto::sha256;
use crate::hash::{Hash, NULL_HASH};
use crate::serialization::serialize;

/// Block header.
///
/// The block hash commits to every header field through the deterministic
/// encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Protocol version.
    pub version: u32,

    /// Hash of the previous block header. All zeros for genesis.
    pub prev_block_hash: Hash,

    /// Unix timestamp in seconds.
    pub timestamp: u64,

    /// Free-form nonce.
    pub nonce: u64,
}

impl BlockHeader {
    /// Protocol version number.
    pub const VERSION: u32 = 1;

    /// Create a header on top of `prev_block_hash`.
    pub fn new(prev_block_hash: Hash, timestamp: u64, nonce: u64) -> Self {
        Self {
            version: Self::VERSION,
            prev_block_hash,
            timestamp,
            nonce,
        }
    }

    /// Compute the block identity hash.
    ///
    /// The hash is SHA-256 of the bincode-serialized header.
    ///
    /// # Panics
    ///
    /// Never in practice: a header is fixed-size integers and a byte array,
    /// which the encoder always accepts.
    pub fn hash(&self) -> Hash {
        let bytes = serialize(self).expect("BlockHeader serialization should not fail");
        sha256(&bytes)
    }

    /// Check if this header has no parent.
    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash == NULL_HASH
    }
}
