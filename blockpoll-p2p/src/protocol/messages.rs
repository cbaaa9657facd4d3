//! Protocol messages consumed and produced by the sync driver.
//!
//! Only the logical fields are defined here. Framing and transport belong to
//! the peer session implementation.

use serde::{Deserialize, Serialize};

use blockpoll_core::serialization::{deserialize, serialize};
use blockpoll_core::{encode_hash, Block, BlockLocator, Hash, InventoryItem, NULL_HASH};

use crate::error::P2pResult;

/// Announcement of objects a peer has available.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryMessage {
    /// Announced items, in peer order.
    pub inventory: Vec<InventoryItem>,
}

/// Request for the full payloads of specific inventory items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetDataMessage {
    /// Requested items.
    pub inventory: Vec<InventoryItem>,
}

/// Request for the block hashes following the first locator hash the peer
/// knows, up to and including `stop_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetBlocksMessage {
    /// Block locator hashes, most recent first.
    pub start_hashes: Vec<Hash>,
    /// Last hash wanted, or the null hash for "as many as possible".
    pub stop_hash: Hash,
}

impl GetBlocksMessage {
    /// Build a request from a locator.
    pub fn new(locator: BlockLocator, stop_hash: Hash) -> Self {
        Self {
            start_hashes: locator.into_hashes(),
            stop_hash,
        }
    }

    /// Whether this request has no stop hash.
    pub fn is_unbounded(&self) -> bool {
        self.stop_hash == NULL_HASH
    }
}

/// A full block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMessage {
    /// The block.
    pub block: Block,
}

/// All messages the sync driver deals with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Message {
    /// Inventory announcement (inbound).
    Inventory(InventoryMessage),
    /// Get-data request (outbound).
    GetData(GetDataMessage),
    /// Get-blocks request (outbound).
    GetBlocks(GetBlocksMessage),
    /// Block payload (inbound).
    Block(BlockMessage),
}

impl Message {
    /// Get a human-readable name for the message type.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Inventory(_) => "inv",
            Message::GetData(_) => "getdata",
            Message::GetBlocks(_) => "getblocks",
            Message::Block(_) => "block",
        }
    }

    /// Encode with the deterministic protocol encoding.
    pub fn encode(&self) -> P2pResult<Vec<u8>> {
        Ok(serialize(self)?)
    }

    /// Decode a message produced by [`Message::encode`].
    pub fn decode(bytes: &[u8]) -> P2pResult<Self> {
        Ok(deserialize(bytes)?)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Inventory(i) => write!(f, "Inventory(count={})", i.inventory.len()),
            Message::GetData(g) => write!(f, "GetData(count={})", g.inventory.len()),
            Message::GetBlocks(g) => write!(
                f,
                "GetBlocks(locators={}, stop={})",
                g.start_hashes.len(),
                &encode_hash(&g.stop_hash)[..16]
            ),
            Message::Block(b) => write!(f, "Block(hash={})", &encode_hash(&b.block.hash())[..16]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpoll_core::BlockHeader;

    #[test]
    fn test_message_names() {
        let getdata = Message::GetData(GetDataMessage { inventory: Vec::new() });
        assert_eq!(getdata.name(), "getdata");

        let inv = Message::Inventory(InventoryMessage { inventory: Vec::new() });
        assert_eq!(inv.name(), "inv");
    }

    #[test]
    fn test_get_blocks_from_locator() {
        let locator = BlockLocator::new(vec![[4u8; 32], [0u8; 32]]).unwrap();
        let msg = GetBlocksMessage::new(locator, NULL_HASH);

        assert_eq!(msg.start_hashes, vec![[4u8; 32], [0u8; 32]]);
        assert!(msg.is_unbounded());

        let bounded = GetBlocksMessage::new(BlockLocator::new(vec![[4u8; 32]]).unwrap(), [9u8; 32]);
        assert!(!bounded.is_unbounded());
    }

    #[test]
    fn test_message_display() {
        let msg = Message::GetBlocks(GetBlocksMessage {
            start_hashes: vec![[1u8; 32]],
            stop_hash: [0xff; 32],
        });
        assert_eq!(msg.to_string(), "GetBlocks(locators=1, stop=ffffffffffffffff)");
    }

    #[test]
    fn test_encoded_block_message_decodes() {
        let block = Block::new(BlockHeader::new(NULL_HASH, 5, 9), vec![1, 2, 3]);
        let msg = Message::Block(BlockMessage { block });

        let bytes = msg.encode().unwrap();
        assert_eq!(Message::decode(&bytes).unwrap(), msg);
        assert!(Message::decode(&bytes[..bytes.len() - 1]).is_err());
    }
}
