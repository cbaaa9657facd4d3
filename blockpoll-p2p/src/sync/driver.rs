//! The sync driver: one per peer session.
//!
//! Every handler below runs on the driver's event loop, one at a time, so
//! the reads and writes of [`DriverState`] never race. Work that has to wait
//! (locator fetches, block storage, sends) is started here and completes by
//! posting a new [`DriverEvent`] back onto the loop.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blockpoll_core::{encode_hash, Block, BlockLocator, Hash, NULL_HASH};

use crate::chain::{ChainService, LocatorProvider, StoreOutcome};
use crate::config::SyncConfig;
use crate::error::{ChainResult, P2pError, P2pResult};
use crate::peer::{PeerSession, SessionId};
use crate::protocol::{GetBlocksMessage, GetDataMessage, InventoryMessage, Message};
use crate::sync::event::{DriverEvent, LocatorReason};
use crate::sync::filter::filter_block_inventory;
use crate::sync::state::{DriverState, LocatorRequest};
use crate::sync::store::StoreQueue;

/// Block synchronization driver for a single peer session.
pub struct SyncDriver {
    /// The session is owned elsewhere; the driver stops once it is gone.
    session: Weak<dyn PeerSession>,
    session_id: SessionId,
    locator: Arc<dyn LocatorProvider>,
    config: SyncConfig,
    state: DriverState,
    /// Sender side of the driver's own event queue.
    events: mpsc::UnboundedSender<DriverEvent>,
    store: StoreQueue,
    store_worker: JoinHandle<()>,
}

impl SyncDriver {
    pub(crate) fn new(
        session: Weak<dyn PeerSession>,
        session_id: SessionId,
        chain: Arc<dyn ChainService>,
        locator: Arc<dyn LocatorProvider>,
        config: SyncConfig,
        events: mpsc::UnboundedSender<DriverEvent>,
    ) -> Self {
        let (store, store_worker) = StoreQueue::spawn(chain, events.clone());
        Self {
            session,
            session_id,
            locator,
            config,
            state: DriverState::new(),
            events,
            store,
            store_worker,
        }
    }

    /// Run the event loop until shutdown or until the session goes away.
    pub(crate) async fn run(mut self, mut events: mpsc::UnboundedReceiver<DriverEvent>) {
        tracing::debug!(session = %self.session_id, "Sync driver started");

        while let Some(event) = events.recv().await {
            if self.handle(event).is_break() {
                break;
            }
        }

        tracing::debug!(
            session = %self.session_id,
            stats = ?self.state.stats,
            "Sync driver stopped"
        );

        // Blocks still queued for storage are abandoned with the driver
        self.store_worker.abort();
        if let Err(e) = self.store_worker.await {
            if e.is_panic() {
                tracing::error!(session = %self.session_id, error = %e, "Store worker panicked");
            }
        }
    }

    /// Dispatch one event to its handler.
    pub(crate) fn handle(&mut self, event: DriverEvent) -> ControlFlow<()> {
        match event {
            DriverEvent::Query => {
                self.query();
                ControlFlow::Continue(())
            }
            DriverEvent::Monitor => self.monitor(),
            DriverEvent::Inventory(result) => self.on_inventory(result),
            DriverEvent::Block(result) => self.on_block(result),
            DriverEvent::Stored { result, hash } => {
                self.on_stored(result, hash);
                ControlFlow::Continue(())
            }
            DriverEvent::Locator {
                result,
                stop_hash,
                reason,
            } => self.ask_blocks(result, stop_hash, reason),
            DriverEvent::Sent { command, result } => {
                self.on_sent(command, result);
                ControlFlow::Continue(())
            }
            DriverEvent::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot(self.session_id));
                ControlFlow::Continue(())
            }
            DriverEvent::Shutdown => ControlFlow::Break(()),
        }
    }

    /// Ask the peer for everything after our current best chain.
    fn query(&mut self) {
        self.fetch_locator(NULL_HASH, LocatorReason::Query);
    }

    /// Start both inbound event streams.
    fn monitor(&mut self) -> ControlFlow<()> {
        let Some(session) = self.session() else {
            return ControlFlow::Break(());
        };
        self.subscribe_inventory(session.as_ref());
        self.subscribe_block(session.as_ref());
        ControlFlow::Continue(())
    }

    fn on_inventory(&mut self, result: P2pResult<InventoryMessage>) -> ControlFlow<()> {
        let Some(session) = self.session() else {
            return ControlFlow::Break(());
        };

        match result {
            Err(e) => {
                self.state.stats.bad_inventories += 1;
                tracing::warn!(session = %self.session_id, error = %e, "Received bad inventory");
            }
            Ok(inv) if inv.inventory.len() > self.config.max_inventory_items => {
                self.state.stats.bad_inventories += 1;
                let e = P2pError::InventoryTooLarge {
                    count: inv.inventory.len(),
                    max: self.config.max_inventory_items,
                };
                tracing::warn!(session = %self.session_id, error = %e, "Received bad inventory");
            }
            Ok(inv) => {
                self.state.stats.inventories_received += 1;
                let last = self.state.last_announced_block();
                let wanted = filter_block_inventory(&inv.inventory, last.as_ref());

                if let Some(item) = wanted.last() {
                    self.state.set_last_announced_block(item.hash);
                    self.state.stats.get_data_sent += 1;
                    tracing::trace!(
                        session = %self.session_id,
                        announced = inv.inventory.len(),
                        requested = wanted.len(),
                        "Requesting block data"
                    );
                    self.send(
                        session.as_ref(),
                        Message::GetData(GetDataMessage { inventory: wanted }),
                    );
                }
            }
        }

        self.subscribe_inventory(session.as_ref());
        ControlFlow::Continue(())
    }

    fn on_block(&mut self, result: P2pResult<Block>) -> ControlFlow<()> {
        let Some(session) = self.session() else {
            return ControlFlow::Break(());
        };

        match result {
            Err(e) => {
                self.state.stats.bad_blocks += 1;
                tracing::warn!(session = %self.session_id, error = %e, "Received bad block");
            }
            Ok(block) => {
                self.state.stats.blocks_received += 1;
                let hash = block.hash();
                if let Err(e) = self.store.submit(block, hash) {
                    self.state.stats.store_failures += 1;
                    tracing::error!(
                        session = %self.session_id,
                        hash = %encode_hash(&hash),
                        error = %e,
                        "Storing block failed"
                    );
                }
            }
        }

        self.subscribe_block(session.as_ref());
        ControlFlow::Continue(())
    }

    fn on_stored(&mut self, result: ChainResult<StoreOutcome>, hash: Hash) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state.stats.store_failures += 1;
                tracing::error!(
                    session = %self.session_id,
                    hash = %encode_hash(&hash),
                    error = %e,
                    "Storing block failed"
                );
                return;
            }
        };

        match outcome {
            StoreOutcome::Orphan => {
                self.state.stats.orphans += 1;
                tracing::warn!(
                    session = %self.session_id,
                    hash = %encode_hash(&hash),
                    "Orphan block"
                );
                // Orphans are not remembered: every sighting re-asks for the
                // range ending at the orphan.
                self.fetch_locator(hash, LocatorReason::Orphan);
            }
            StoreOutcome::Rejected => {
                self.state.stats.blocks_rejected += 1;
                tracing::warn!(
                    session = %self.session_id,
                    hash = %encode_hash(&hash),
                    "Rejected block"
                );
            }
            StoreOutcome::Confirmed { height } => {
                self.state.stats.blocks_confirmed += 1;
                tracing::info!(
                    session = %self.session_id,
                    height,
                    hash = %encode_hash(&hash),
                    "Block confirmed"
                );
            }
        }
    }

    /// Send a get-blocks request unless it repeats the previous one.
    fn ask_blocks(
        &mut self,
        result: ChainResult<BlockLocator>,
        stop_hash: Hash,
        reason: LocatorReason,
    ) -> ControlFlow<()> {
        let locator = match result {
            Ok(locator) => locator,
            Err(e) => {
                self.state.stats.locator_failures += 1;
                match reason {
                    LocatorReason::Query => tracing::error!(
                        session = %self.session_id,
                        error = %e,
                        "Fetching initial block locator failed"
                    ),
                    LocatorReason::Orphan => tracing::error!(
                        session = %self.session_id,
                        error = %e,
                        "Ask for blocks failed"
                    ),
                }
                return ControlFlow::Continue(());
            }
        };

        let Some(session) = self.session() else {
            return ControlFlow::Break(());
        };

        let request = LocatorRequest {
            locator_head: locator.front(),
            stop_hash,
            session: self.session_id,
        };

        if self.state.is_duplicate_request(&request) {
            self.state.stats.duplicate_requests_skipped += 1;
            tracing::debug!(
                session = %self.session_id,
                head = %encode_hash(&request.locator_head),
                "Skipping duplicate ask blocks"
            );
            return ControlFlow::Continue(());
        }

        self.state.stats.get_blocks_sent += 1;
        self.send(
            session.as_ref(),
            Message::GetBlocks(GetBlocksMessage::new(locator, stop_hash)),
        );
        self.state.record_request(request);
        ControlFlow::Continue(())
    }

    fn on_sent(&mut self, command: &'static str, result: P2pResult<()>) {
        if let Err(e) = result {
            self.state.stats.send_failures += 1;
            tracing::error!(session = %self.session_id, command, error = %e, "Send problem");
        }
    }

    /// Upgrade the session handle, or note that it is gone.
    fn session(&self) -> Option<Arc<dyn PeerSession>> {
        let session = self.session.upgrade();
        if session.is_none() {
            tracing::debug!(session = %self.session_id, "Peer session closed");
        }
        session
    }

    fn fetch_locator(&self, stop_hash: Hash, reason: LocatorReason) {
        let locator = self.locator.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = locator.fetch_locator().await;
            let _ = events.send(DriverEvent::Locator {
                result,
                stop_hash,
                reason,
            });
        });
    }

    /// Queue a message and report its completion back onto the loop.
    fn send(&self, session: &dyn PeerSession, message: Message) {
        let command = message.name();
        let receipt = session.send(message);
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = receipt.await.unwrap_or_else(|_| {
                Err(P2pError::SendFailed("session dropped the receipt".to_string()))
            });
            let _ = events.send(DriverEvent::Sent { command, result });
        });
    }

    fn subscribe_inventory(&self, session: &dyn PeerSession) {
        let events = self.events.clone();
        session.subscribe_inventory(Box::new(move |result| {
            let _ = events.send(DriverEvent::Inventory(result));
        }));
    }

    fn subscribe_block(&self, session: &dyn PeerSession) {
        let events = self.events.clone();
        session.subscribe_block(Box::new(move |result| {
            let _ = events.send(DriverEvent::Block(result));
        }));
    }
}
