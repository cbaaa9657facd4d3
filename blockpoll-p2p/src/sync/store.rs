//! Block storage worker.
//!
//! Blocks are handed to the chain service one at a time, in the order they
//! were received, off the driver's event loop. Each completion is posted back
//! as a [`DriverEvent::Stored`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blockpoll_core::{Block, Hash};

use crate::chain::ChainService;
use crate::error::{P2pError, P2pResult};
use crate::sync::event::DriverEvent;

/// Sending side of the storage queue.
#[derive(Debug, Clone)]
pub(crate) struct StoreQueue {
    tx: mpsc::UnboundedSender<(Block, Hash)>,
}

impl StoreQueue {
    /// Spawn the worker. It exits once every queue handle is dropped and the
    /// backlog is drained, or when the driver stops listening.
    pub(crate) fn spawn(
        chain: Arc<dyn ChainService>,
        events: mpsc::UnboundedSender<DriverEvent>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<(Block, Hash)>();

        let handle = tokio::spawn(async move {
            while let Some((block, hash)) = rx.recv().await {
                let result = chain.store(block).await;
                if events.send(DriverEvent::Stored { result, hash }).is_err() {
                    break;
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Queue a block for storage.
    pub(crate) fn submit(&self, block: Block, hash: Hash) -> P2pResult<()> {
        self.tx
            .send((block, hash))
            .map_err(|_| P2pError::DriverStopped)
    }
}
