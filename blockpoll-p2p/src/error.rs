//! Sync driver error types.

use blockpoll_core::{encode_hash, CoreError, Hash};
use thiserror::Error;

/// P2P-level errors: delivery, sending and driver lifecycle.
#[derive(Debug, Error)]
pub enum P2pError {
    /// Failed to serialize or deserialize a message.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A message arrived but could not be interpreted.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Inventory announcement exceeds the configured item cap.
    #[error("Inventory too large: {count} items (max: {max})")]
    InventoryTooLarge { count: usize, max: usize },

    /// Message could not be written to the peer.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Chain or locator service failure.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// The driver event loop is no longer running.
    #[error("Sync driver stopped")]
    DriverStopped,
}

impl From<blockpoll_core::SerializationError> for P2pError {
    fn from(err: blockpoll_core::SerializationError) -> Self {
        P2pError::Serialization(err.to_string())
    }
}

/// Result type for P2P operations.
pub type P2pResult<T> = Result<T, P2pError>;

/// Errors reported by the chain service and the locator provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Block is already part of the chain.
    #[error("Duplicate block {}", encode_hash(.hash))]
    Duplicate { hash: Hash },

    /// The chain could not produce a locator.
    #[error("Locator unavailable: {0}")]
    LocatorUnavailable(String),

    /// Storage backend failure.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Core type invariant violated.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for chain service operations.
pub type ChainResult<T> = Result<T, ChainError>;
