//! Node configuration.

use std::time::Duration;

use blockpoll_p2p::memory::DEFAULT_MAX_ORPHANS;
use blockpoll_p2p::{SyncConfig, MAX_INVENTORY_ITEMS};

use crate::cli::Cli;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Blocks on the simulated peer's chain, genesis excluded.
    pub blocks: u64,

    /// Maximum block inventory items per get-blocks response.
    pub batch_size: usize,

    /// Shuffle the blocks of each get-data response.
    pub shuffle: bool,

    /// Seed for chain generation and shuffling.
    pub seed: u64,

    /// How long to wait for the local chain to catch up.
    pub timeout: Duration,

    /// Maximum accepted inventory size.
    pub max_inventory_items: usize,

    /// Orphan pool capacity of the local chain.
    pub max_orphans: usize,

    /// Log level.
    pub log_level: String,
}

impl NodeConfig {
    /// Create a node configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            blocks: cli.blocks,
            // A zero batch would never make progress
            batch_size: cli.batch_size.max(1),
            shuffle: cli.shuffle,
            seed: cli.seed,
            timeout: Duration::from_secs(cli.timeout_secs),
            max_inventory_items: cli.max_inventory.unwrap_or(MAX_INVENTORY_ITEMS),
            max_orphans: cli.max_orphans.unwrap_or(DEFAULT_MAX_ORPHANS),
            log_level: cli.log_level.clone(),
        }
    }

    /// Build the sync driver configuration.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new().with_max_inventory_items(self.max_inventory_items)
    }

    /// Set the simulated chain length.
    pub fn with_blocks(mut self, blocks: u64) -> Self {
        self.blocks = blocks;
        self
    }

    /// Set the get-blocks batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Enable or disable shuffled delivery.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the catch-up timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            blocks: 1200,
            batch_size: 500,
            shuffle: false,
            seed: 0,
            timeout: Duration::from_secs(60),
            max_inventory_items: MAX_INVENTORY_ITEMS,
            max_orphans: DEFAULT_MAX_ORPHANS,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.blocks, 1200);
        assert_eq!(config.batch_size, 500);
        assert_eq!(config.max_orphans, DEFAULT_MAX_ORPHANS);
        assert_eq!(config.sync_config().max_inventory_items, MAX_INVENTORY_ITEMS);
        assert!(!config.sync_config().start_on_spawn);
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "blockpoll-node",
            "--batch-size",
            "0",
            "--timeout-secs",
            "5",
            "--max-inventory",
            "100",
            "--max-orphans",
            "16",
        ]);
        let config = NodeConfig::from_cli(&cli);

        assert_eq!(config.batch_size, 1);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.sync_config().max_inventory_items, 100);
        assert_eq!(config.max_orphans, 16);
    }
}
