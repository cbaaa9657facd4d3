//! In-memory peer session.

use std::sync::{Mutex, MutexGuard};

use blockpoll_core::Block;

use crate::error::{P2pError, P2pResult};
use crate::peer::{
    ready_receipt, BlockHandler, InventoryHandler, PeerSession, SendReceipt, SessionId,
};
use crate::protocol::{InventoryMessage, Message};

#[derive(Default)]
struct SessionInner {
    sent: Vec<Message>,
    inventory_handler: Option<InventoryHandler>,
    block_handler: Option<BlockHandler>,
    fail_sends: bool,
}

/// Peer session that records outbound messages and lets the caller inject
/// inbound events.
///
/// Each subscription holds at most one handler; registering a new one
/// replaces the previous. Delivering an event consumes the handler.
pub struct MemorySession {
    id: SessionId,
    inner: Mutex<SessionInner>,
}

impl MemorySession {
    /// Create a session with the given identity.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<Message> {
        self.lock().sent.clone()
    }

    /// Drain the sent messages.
    pub fn take_sent(&self) -> Vec<Message> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Make every following send fail (`true`) or succeed (`false`).
    pub fn set_fail_sends(&self, fail: bool) {
        self.lock().fail_sends = fail;
    }

    /// Check if an inventory handler is registered.
    pub fn has_inventory_subscriber(&self) -> bool {
        self.lock().inventory_handler.is_some()
    }

    /// Check if a block handler is registered.
    pub fn has_block_subscriber(&self) -> bool {
        self.lock().block_handler.is_some()
    }

    /// Hand an inventory event to the registered handler.
    ///
    /// Returns false, dropping the event, if nobody is subscribed.
    pub fn deliver_inventory(&self, result: P2pResult<InventoryMessage>) -> bool {
        // Take the handler first: it may subscribe again from inside
        let handler = self.lock().inventory_handler.take();
        match handler {
            Some(handler) => {
                handler(result);
                true
            }
            None => false,
        }
    }

    /// Hand a block event to the registered handler.
    ///
    /// Returns false, dropping the event, if nobody is subscribed.
    pub fn deliver_block(&self, result: P2pResult<Block>) -> bool {
        let handler = self.lock().block_handler.take();
        match handler {
            Some(handler) => {
                handler(result);
                true
            }
            None => false,
        }
    }
}

impl PeerSession for MemorySession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, message: Message) -> SendReceipt {
        let mut inner = self.lock();
        if inner.fail_sends {
            return ready_receipt(Err(P2pError::SendFailed(format!(
                "{} rejected by session",
                message.name()
            ))));
        }
        inner.sent.push(message);
        ready_receipt(Ok(()))
    }

    fn subscribe_inventory(&self, handler: InventoryHandler) {
        self.lock().inventory_handler = Some(handler);
    }

    fn subscribe_block(&self, handler: BlockHandler) {
        self.lock().block_handler = Some(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_send_records_messages() {
        let session = MemorySession::new(SessionId::new(1));
        let message = Message::GetData(crate::protocol::GetDataMessage { inventory: vec![] });

        let receipt = session.send(message.clone());
        assert!(receipt.await.unwrap().is_ok());
        assert_eq!(session.sent(), vec![message.clone()]);

        assert_eq!(session.take_sent(), vec![message]);
        assert!(session.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_not_recorded() {
        let session = MemorySession::new(SessionId::new(1));
        session.set_fail_sends(true);

        let receipt = session.send(Message::GetData(crate::protocol::GetDataMessage {
            inventory: vec![],
        }));
        assert!(matches!(receipt.await.unwrap(), Err(P2pError::SendFailed(_))));
        assert!(session.sent().is_empty());
    }

    #[test]
    fn test_handler_fires_once() {
        let session = MemorySession::new(SessionId::new(1));
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        session.subscribe_inventory(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(session.has_inventory_subscriber());

        let inv = InventoryMessage { inventory: vec![] };
        assert!(session.deliver_inventory(Ok(inv.clone())));
        assert!(!session.deliver_inventory(Ok(inv)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!session.has_inventory_subscriber());
    }

    #[test]
    fn test_block_without_subscriber_dropped() {
        let session = MemorySession::new(SessionId::new(1));
        assert!(!session.deliver_block(Err(P2pError::MalformedMessage("x".into()))));
    }
}
