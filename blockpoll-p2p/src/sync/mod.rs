//! Block synchronization.
//!
//! One [`SyncDriver`] runs per peer session, as its own tokio task:
//! 1. `query` fetches a locator and sends get-blocks (stop = null hash)
//! 2. Inventory announcements turn into get-data requests for new blocks
//! 3. Received blocks go to the chain service
//! 4. An orphan outcome fetches a fresh locator and sends get-blocks with
//!    the orphan as stop hash
//!
//! All inbound events, completions and control requests share one queue, so
//! the driver's handlers never run concurrently with each other.

mod driver;
mod event;
mod filter;
mod state;
mod store;

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::chain::{ChainService, LocatorProvider};
use crate::config::SyncConfig;
use crate::error::{P2pError, P2pResult};
use crate::peer::{PeerSession, SessionId};

pub use driver::SyncDriver;
pub use filter::filter_block_inventory;
pub use state::{DriverSnapshot, DriverState, DriverStats, LocatorRequest};

use event::DriverEvent;

impl SyncDriver {
    /// Spawn a driver for `session` on the current tokio runtime.
    ///
    /// The driver only keeps a weak reference to the session and stops by
    /// itself once the session is dropped.
    pub fn spawn<S: PeerSession>(
        session: &Arc<S>,
        chain: Arc<dyn ChainService>,
        locator: Arc<dyn LocatorProvider>,
        config: SyncConfig,
    ) -> (DriverHandle, JoinHandle<()>) {
        let session_id = session.id();
        let weak: Weak<dyn PeerSession> = Arc::downgrade(session) as Weak<dyn PeerSession>;
        let (tx, rx) = mpsc::unbounded_channel();

        if config.start_on_spawn {
            let _ = tx.send(DriverEvent::Monitor);
            let _ = tx.send(DriverEvent::Query);
        }

        let driver = SyncDriver::new(weak, session_id, chain, locator, config, tx.clone());
        let task = tokio::spawn(driver.run(rx));

        (
            DriverHandle {
                session: session_id,
                events: tx,
            },
            task,
        )
    }
}

/// Control handle for a running driver.
#[derive(Debug, Clone)]
pub struct DriverHandle {
    session: SessionId,
    events: mpsc::UnboundedSender<DriverEvent>,
}

impl DriverHandle {
    /// Session served by the driver.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Ask the peer for blocks after our current best chain.
    pub fn query(&self) -> P2pResult<()> {
        self.post(DriverEvent::Query)
    }

    /// Subscribe the driver to the session's inventory and block events.
    pub fn monitor(&self) -> P2pResult<()> {
        self.post(DriverEvent::Monitor)
    }

    /// Monitor then query.
    pub fn start(&self) -> P2pResult<()> {
        self.monitor()?;
        self.query()
    }

    /// Current driver state. Answered after every event queued before it.
    pub async fn snapshot(&self) -> P2pResult<DriverSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.post(DriverEvent::Snapshot(tx))?;
        rx.await.map_err(|_| P2pError::DriverStopped)
    }

    /// Stop the driver. Its state is dropped with the task.
    pub fn shutdown(&self) {
        let _ = self.events.send(DriverEvent::Shutdown);
    }

    /// Check if the driver task has exited.
    pub fn is_stopped(&self) -> bool {
        self.events.is_closed()
    }

    fn post(&self, event: DriverEvent) -> P2pResult<()> {
        self.events.send(event).map_err(|_| P2pError::DriverStopped)
    }
}
