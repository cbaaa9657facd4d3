//! In-memory collaborators.
//!
//! Reference implementations of the chain service, locator provider and
//! peer session, used by the simulation binary and the tests.

pub mod chain;
pub mod session;

pub use chain::{build_block_locator, MemoryChain, DEFAULT_MAX_ORPHANS, LOCATOR_DEPTH};
pub use session::MemorySession;
