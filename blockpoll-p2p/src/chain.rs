//! Chain-side collaborators of the sync driver.

use std::fmt;

use async_trait::async_trait;

use blockpoll_core::{Block, BlockLocator};

use crate::error::ChainResult;

/// Result of handing a block to the chain service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Block connected to the chain at `height`.
    Confirmed {
        /// Height of the block.
        height: u64,
    },
    /// Block parent is unknown; the block waits in the orphan pool.
    Orphan,
    /// Block is invalid and will not be retried.
    Rejected,
}

impl fmt::Display for StoreOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOutcome::Confirmed { height } => write!(f, "confirmed({})", height),
            StoreOutcome::Orphan => write!(f, "orphan"),
            StoreOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

/// Block storage and validation.
#[async_trait]
pub trait ChainService: Send + Sync + 'static {
    /// Validate and store a block.
    ///
    /// Orphans are reported as `Ok(StoreOutcome::Orphan)`, never as errors.
    async fn store(&self, block: Block) -> ChainResult<StoreOutcome>;
}

/// Source of block locators for the current best chain.
#[async_trait]
pub trait LocatorProvider: Send + Sync + 'static {
    /// Build a locator from the current best chain.
    async fn fetch_locator(&self) -> ChainResult<BlockLocator>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        assert_eq!(StoreOutcome::Confirmed { height: 100 }.to_string(), "confirmed(100)");
        assert_eq!(StoreOutcome::Orphan.to_string(), "orphan");
        assert_eq!(StoreOutcome::Rejected.to_string(), "rejected");
    }
}
