//! Command-line argument parsing.

use clap::Parser;

/// Block sync simulation node.
#[derive(Parser, Debug, Clone)]
#[command(name = "blockpoll-node")]
#[command(about = "Sync a local chain from a simulated peer")]
#[command(version)]
pub struct Cli {
    /// Number of blocks on the simulated peer's chain, genesis excluded.
    #[arg(long, default_value_t = 1200)]
    pub blocks: u64,

    /// Maximum block inventory items per get-blocks response.
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,

    /// Deliver the blocks of each get-data response in random order.
    #[arg(long)]
    pub shuffle: bool,

    /// Seed for chain generation and shuffling.
    #[arg(long, env = "BLOCKPOLL_SEED", default_value_t = 0)]
    pub seed: u64,

    /// Give up if the local chain has not caught up after this many seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Maximum accepted inventory size.
    #[arg(long)]
    pub max_inventory: Option<usize>,

    /// Orphan pool capacity of the local chain.
    #[arg(long)]
    pub max_orphans: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::parse_from(["blockpoll-node"]);
        assert_eq!(cli.blocks, 1200);
        assert_eq!(cli.batch_size, 500);
        assert!(!cli.shuffle);
        assert_eq!(cli.timeout_secs, 60);
        assert_eq!(cli.max_inventory, None);
        assert_eq!(cli.max_orphans, None);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_simulation_flags() {
        let cli = Cli::parse_from([
            "blockpoll-node",
            "--blocks",
            "50",
            "--batch-size",
            "8",
            "--shuffle",
            "--seed",
            "7",
        ]);
        assert_eq!(cli.blocks, 50);
        assert_eq!(cli.batch_size, 8);
        assert!(cli.shuffle);
        assert_eq!(cli.seed, 7);
    }
}
