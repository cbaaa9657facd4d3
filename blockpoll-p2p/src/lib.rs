//! Per-peer block synchronization.
//!
//! This crate drives block download from a single connected peer:
//!
//! - Asking the peer for blocks after the local best chain (get-blocks)
//! - Requesting announced blocks (get-data), skipping repeats
//! - Handing received blocks to the chain service
//! - Asking for the missing range below orphan blocks
//!
//! # Architecture
//!
//! Each peer session gets its own driver, running as one tokio task that
//! consumes a single event queue. Inbound events, chain completions and
//! control requests all go through that queue, so handlers never overlap.
//!
//! ```text
//! DriverHandle ──┐
//! PeerSession ───┼──> event queue ──> SyncDriver::run()
//! store worker ──┤                     ├── send get-blocks / get-data
//! locator task ──┘                     └── submit blocks to store worker
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use blockpoll_p2p::{MemoryChain, MemorySession, SessionId, SyncConfig, SyncDriver};
//!
//! let chain = Arc::new(MemoryChain::new(genesis));
//! let session = Arc::new(MemorySession::new(SessionId::next()));
//!
//! let (handle, task) = SyncDriver::spawn(&session, chain.clone(), chain, SyncConfig::default());
//! handle.start()?;
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod memory;
pub mod peer;
pub mod protocol;
pub mod sync;

// Re-export main types
pub use chain::{ChainService, LocatorProvider, StoreOutcome};
pub use config::{SyncConfig, MAX_INVENTORY_ITEMS};
pub use error::{ChainError, ChainResult, P2pError, P2pResult};
pub use memory::{MemoryChain, MemorySession};
pub use peer::{PeerSession, SessionId};
pub use protocol::Message;
pub use sync::{DriverHandle, DriverSnapshot, DriverStats, SyncDriver};
