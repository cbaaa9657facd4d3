//! # Blockpoll Core
//!
//! Primitive types shared by the blockpoll crates:
//! - 32-byte block identity hashes and the null stop hash
//! - SHA-256 hashing
//! - Block header and opaque block payloads
//! - Inventory items and block locators
//! - Deterministic binary serialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod block;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod inventory;
pub mod locator;
pub mod serialization;

// Re-export commonly used types at crate root
pub use block::{Block, BlockHeader};
pub use error::{CoreError, SerializationError};
pub use hash::{encode_hash, Hash, NULL_HASH};
pub use inventory::{InventoryItem, InventoryKind};
pub use locator::BlockLocator;
