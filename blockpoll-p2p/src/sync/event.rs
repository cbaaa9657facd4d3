//! Events processed by the driver event loop.

use tokio::sync::oneshot;

use blockpoll_core::{Block, BlockLocator, Hash};

use crate::chain::StoreOutcome;
use crate::error::{ChainResult, P2pResult};
use crate::protocol::InventoryMessage;
use crate::sync::DriverSnapshot;

/// Why a locator was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocatorReason {
    /// Initial request for a session.
    Query,
    /// Filling the gap below an orphan block.
    Orphan,
}

/// Everything that reaches the driver goes through one queue of these.
#[derive(Debug)]
pub(crate) enum DriverEvent {
    /// Start synchronizing: fetch a locator and ask for blocks.
    Query,
    /// Subscribe to inventory and block events.
    Monitor,
    /// An inventory event was delivered.
    Inventory(P2pResult<InventoryMessage>),
    /// A block event was delivered.
    Block(P2pResult<Block>),
    /// The chain finished storing a block.
    Stored {
        result: ChainResult<StoreOutcome>,
        hash: Hash,
    },
    /// A locator fetch completed.
    Locator {
        result: ChainResult<BlockLocator>,
        stop_hash: Hash,
        reason: LocatorReason,
    },
    /// A send completed.
    Sent {
        command: &'static str,
        result: P2pResult<()>,
    },
    /// Report the current state.
    Snapshot(oneshot::Sender<DriverSnapshot>),
    /// Stop the event loop.
    Shutdown,
}
