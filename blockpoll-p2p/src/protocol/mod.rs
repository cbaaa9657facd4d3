//! P2P protocol layer.
//!
//! Message definitions for block synchronization: inventory announcements,
//! get-data and get-blocks requests, and block payloads.

pub mod messages;

// Re-export main types
pub use messages::{BlockMessage, GetBlocksMessage, GetDataMessage, InventoryMessage, Message};
