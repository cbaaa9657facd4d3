//! Block structure: a header plus an opaque payload.

use serde::{Deserialize, Serialize};

use crate::block::BlockHeader;
use crate::hash::Hash;

/// A block. The payload is never interpreted by the sync layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block header.
    pub header: BlockHeader,

    /// Opaque block body.
    pub payload: Vec<u8>,
}

impl Block {
    /// Create a block from a header and payload.
    pub fn new(header: BlockHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    /// Get the block hash (delegates to header).
    #[inline]
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Hash of the parent block.
    #[inline]
    pub fn parent_hash(&self) -> Hash {
        self.header.prev_block_hash
    }

    /// Check if this is a genesis block.
    #[inline]
    pub fn is_genesis(&self) -> bool {
        self.header.is_genesis()
    }
}
