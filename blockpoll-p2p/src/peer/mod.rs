//! Peer sessions.
//!
//! This module provides:
//! - Per-connection session identifiers
//! - The session interface the sync driver drives

pub mod info;
pub mod session;

// Re-export main types
pub use info::SessionId;
pub use session::{ready_receipt, BlockHandler, InventoryHandler, PeerSession, SendReceipt};
