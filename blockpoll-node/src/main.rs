//! Block sync simulation binary.
//!
//! Generates a chain on a simulated peer and syncs a local chain from it,
//! logging the driver's progress along the way.

use tracing_subscriber::EnvFilter;

use blockpoll_node::cli::Cli;
use blockpoll_node::config::NodeConfig;
use blockpoll_node::node::Node;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::info!("Blockpoll Node v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = NodeConfig::from_cli(&cli);

    // Create and run node
    let node = Node::new(config);
    let report = node.run().await?;

    if !report.is_synced() {
        anyhow::bail!(
            "Sync incomplete: height {} of {} ({:?})",
            report.local_height,
            report.remote_height,
            report.outcome
        );
    }

    Ok(())
}
