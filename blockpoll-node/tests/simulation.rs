//! End-to-end sync against a simulated peer.
//!
//! These tests verify that a local chain catches up with the peer:
//! 1. In-order delivery across several get-blocks batches
//! 2. Shuffled delivery, where orphans drive the gap requests
//! 3. A chain shorter than one batch
//! 4. The timeout when nothing can be fetched

use std::time::Duration;

use tokio::time::timeout;

use blockpoll_node::config::NodeConfig;
use blockpoll_node::node::{Node, RunOutcome};

/// Upper bound on any single run.
const RUN_TIMEOUT: Duration = Duration::from_secs(60);

fn config(blocks: u64, batch_size: usize, shuffle: bool) -> NodeConfig {
    NodeConfig::default()
        .with_blocks(blocks)
        .with_batch_size(batch_size)
        .with_shuffle(shuffle)
        .with_seed(42)
        .with_timeout(Duration::from_secs(30))
}

#[tokio::test]
async fn test_in_order_sync_across_batches() {
    let node = Node::new(config(1200, 500, false));

    let report = timeout(RUN_TIMEOUT, node.run_until(std::future::pending()))
        .await
        .expect("run should finish")
        .unwrap();

    assert!(report.is_synced(), "local chain should reach the peer's tip");
    assert_eq!(report.local_height, 1200);

    let stats = report.snapshot.unwrap().stats;
    // One initial request plus one per continuation
    assert_eq!(stats.get_blocks_sent, 3);
    // The tip arrives early as an orphan and is connected by its parent
    assert_eq!(stats.orphans, 2);
    assert_eq!(stats.blocks_confirmed, 1199);
    assert_eq!(stats.blocks_rejected, 0);
}

#[tokio::test]
async fn test_shuffled_sync_converges() {
    let node = Node::new(config(200, 25, true));

    let report = timeout(RUN_TIMEOUT, node.run_until(std::future::pending()))
        .await
        .expect("run should finish")
        .unwrap();

    assert!(report.is_synced(), "shuffled delivery should still converge");
    assert_eq!(report.local_height, 200);
    assert_eq!(node.local_chain().orphan_count().await, 0);

    let stats = report.snapshot.unwrap().stats;
    assert!(stats.orphans > 0);
}

#[tokio::test]
async fn test_single_batch_sync() {
    let node = Node::new(config(20, 500, false));

    let report = timeout(RUN_TIMEOUT, node.run_until(std::future::pending()))
        .await
        .expect("run should finish")
        .unwrap();

    assert!(report.is_synced());
    let stats = report.snapshot.unwrap().stats;
    assert_eq!(stats.get_blocks_sent, 1);
    assert_eq!(stats.get_data_sent, 1);
    assert_eq!(stats.orphans, 0);
}

#[tokio::test]
async fn test_timeout_when_sync_cannot_progress() {
    let node = Node::new(config(20, 500, false).with_timeout(Duration::from_millis(200)));
    node.local_chain().set_locator_available(false);

    let report = timeout(RUN_TIMEOUT, node.run_until(std::future::pending()))
        .await
        .expect("run should finish")
        .unwrap();

    assert_eq!(report.outcome, RunOutcome::TimedOut);
    assert_eq!(report.local_height, 0);
    assert_eq!(report.snapshot.unwrap().stats.locator_failures, 1);
}
