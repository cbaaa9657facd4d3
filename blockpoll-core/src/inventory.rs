//! Inventory items announced by peers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hash::{encode_hash, Hash};

/// Kind of object an inventory item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryKind {
    /// Placeholder kind carried by malformed announcements.
    Error,
    /// A transaction.
    Transaction,
    /// A block.
    Block,
    /// Any kind this node does not understand.
    Unknown(u32),
}

impl InventoryKind {
    /// Map a wire type identifier onto a kind.
    pub fn from_wire(id: u32) -> Self {
        match id {
            0 => InventoryKind::Error,
            1 => InventoryKind::Transaction,
            2 => InventoryKind::Block,
            other => InventoryKind::Unknown(other),
        }
    }

    /// Wire type identifier of this kind.
    pub fn to_wire(self) -> u32 {
        match self {
            InventoryKind::Error => 0,
            InventoryKind::Transaction => 1,
            InventoryKind::Block => 2,
            InventoryKind::Unknown(id) => id,
        }
    }
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryKind::Error => write!(f, "error"),
            InventoryKind::Transaction => write!(f, "tx"),
            InventoryKind::Block => write!(f, "block"),
            InventoryKind::Unknown(id) => write!(f, "unknown({})", id),
        }
    }
}

/// A `(kind, hash)` pair announced by a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Object kind.
    pub kind: InventoryKind,
    /// Object hash.
    pub hash: Hash,
}

impl InventoryItem {
    /// Create an inventory item.
    pub fn new(kind: InventoryKind, hash: Hash) -> Self {
        Self { kind, hash }
    }

    /// Create a block inventory item.
    pub fn block(hash: Hash) -> Self {
        Self::new(InventoryKind::Block, hash)
    }

    /// Create a transaction inventory item.
    pub fn transaction(hash: Hash) -> Self {
        Self::new(InventoryKind::Transaction, hash)
    }

    /// Check if this item announces a block.
    #[inline]
    pub fn is_block(&self) -> bool {
        self.kind == InventoryKind::Block
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, encode_hash(&self.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_ids() {
        assert_eq!(InventoryKind::from_wire(2), InventoryKind::Block);
        assert_eq!(InventoryKind::from_wire(1), InventoryKind::Transaction);
        assert_eq!(InventoryKind::from_wire(0), InventoryKind::Error);
        assert_eq!(InventoryKind::from_wire(0x4000_0001), InventoryKind::Unknown(0x4000_0001));
        assert_eq!(InventoryKind::Unknown(9).to_wire(), 9);
        assert_eq!(InventoryKind::Block.to_wire(), 2);
    }

    #[test]
    fn test_is_block() {
        assert!(InventoryItem::block([1u8; 32]).is_block());
        assert!(!InventoryItem::transaction([1u8; 32]).is_block());
        assert!(!InventoryItem::new(InventoryKind::Unknown(2), [1u8; 32]).is_block());
    }

    #[test]
    fn test_display() {
        let item = InventoryItem::block([0u8; 32]);
        assert_eq!(item.to_string(), format!("block:{}", "0".repeat(64)));
    }
}
