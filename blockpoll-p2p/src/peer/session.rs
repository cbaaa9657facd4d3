//! Peer session interface.
//!
//! The session owns the connection. The sync driver only sends messages
//! through it and registers one-shot handlers for inbound inventory and
//! block events.

use tokio::sync::oneshot;

use blockpoll_core::Block;

use crate::error::P2pResult;
use crate::peer::SessionId;
use crate::protocol::{InventoryMessage, Message};

/// One-shot handler for the next inventory event.
pub type InventoryHandler = Box<dyn FnOnce(P2pResult<InventoryMessage>) + Send + 'static>;

/// One-shot handler for the next block event.
pub type BlockHandler = Box<dyn FnOnce(P2pResult<Block>) + Send + 'static>;

/// Completion of a send: resolves once the message was written or failed.
pub type SendReceipt = oneshot::Receiver<P2pResult<()>>;

/// A connected peer, as seen by the sync driver.
///
/// None of these methods may block: `send` queues the message and reports
/// through the receipt, and the subscribe methods only register a handler.
pub trait PeerSession: Send + Sync + 'static {
    /// Identity of this connection.
    fn id(&self) -> SessionId;

    /// Queue a message for the peer.
    fn send(&self, message: Message) -> SendReceipt;

    /// Register a handler for the next inventory event only.
    fn subscribe_inventory(&self, handler: InventoryHandler);

    /// Register a handler for the next block event only.
    fn subscribe_block(&self, handler: BlockHandler);
}

/// Build a receipt that has already resolved.
pub fn ready_receipt(result: P2pResult<()>) -> SendReceipt {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(result);
    rx
}
