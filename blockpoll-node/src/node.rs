//! Simulation node.
//!
//! Syncs a local in-memory chain from a [`SimulatedPeer`] through one sync
//! driver, and reports how far it got.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::sleep;

use blockpoll_core::{encode_hash, Hash};
use blockpoll_p2p::{DriverSnapshot, MemoryChain, PeerSession, SessionId, SyncDriver};

use crate::config::NodeConfig;
use crate::shutdown::wait_for_shutdown_signal;
use crate::sim::{generate_chain, genesis_block, SimulatedPeer};

/// How often the local height is checked.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a simulation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The local chain reached the peer's tip.
    Synced,
    /// The timeout expired first.
    TimedOut,
    /// A shutdown was requested.
    Interrupted,
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Height of the peer's chain.
    pub remote_height: u64,
    /// Height of the local chain.
    pub local_height: u64,
    /// Tip of the peer's chain.
    pub remote_tip: Hash,
    /// Tip of the local chain.
    pub local_tip: Hash,
    /// Driver state at the end of the run.
    pub snapshot: Option<DriverSnapshot>,
    /// Wall time spent.
    pub elapsed: Duration,
}

impl SyncReport {
    /// Check if both chains end at the same block.
    pub fn is_synced(&self) -> bool {
        self.outcome == RunOutcome::Synced && self.local_tip == self.remote_tip
    }
}

/// The simulation node.
pub struct Node {
    /// Node configuration.
    config: NodeConfig,

    /// Chain being synced.
    local: Arc<MemoryChain>,

    /// Peer serving the full chain.
    remote: Arc<SimulatedPeer>,
}

impl Node {
    /// Generate the peer's chain and an empty local chain.
    pub fn new(config: NodeConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let chain = generate_chain(genesis_block(), config.blocks, &mut rng);

        let remote = Arc::new(SimulatedPeer::new(
            SessionId::next(),
            chain,
            config.batch_size,
            config.shuffle,
            config.seed,
        ));
        let local =
            Arc::new(MemoryChain::new(genesis_block()).with_max_orphans(config.max_orphans));

        Self {
            config,
            local,
            remote,
        }
    }

    /// Local chain.
    pub fn local_chain(&self) -> &Arc<MemoryChain> {
        &self.local
    }

    /// Simulated peer.
    pub fn remote(&self) -> &Arc<SimulatedPeer> {
        &self.remote
    }

    /// Node configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Run until synced, timed out, or interrupted by a signal.
    pub async fn run(&self) -> anyhow::Result<SyncReport> {
        self.run_until(wait_for_shutdown_signal()).await
    }

    /// Run until synced, timed out, or `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F) -> anyhow::Result<SyncReport>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Starting block sync simulation...");
        tracing::info!("  Peer session: {}", self.remote.id());
        tracing::info!("  Peer height: {}", self.remote.height());
        tracing::info!("  Batch size: {}", self.config.batch_size);
        tracing::info!("  Shuffled delivery: {}", self.config.shuffle);

        let started = Instant::now();
        let (handle, task) = SyncDriver::spawn(
            &self.remote,
            self.local.clone(),
            self.local.clone(),
            self.config.sync_config(),
        );
        handle.start()?;

        let target = self.remote.height();
        let local = self.local.clone();
        let caught_up = async move {
            while local.height().await < target {
                sleep(POLL_INTERVAL).await;
            }
        };

        let outcome = tokio::select! {
            _ = caught_up => RunOutcome::Synced,
            _ = sleep(self.config.timeout) => RunOutcome::TimedOut,
            _ = shutdown => RunOutcome::Interrupted,
        };

        let snapshot = match handle.snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Driver stopped before the end of the run");
                None
            }
        };

        handle.shutdown();
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Sync driver task failed");
        }

        let report = SyncReport {
            outcome,
            remote_height: target,
            local_height: self.local.height().await,
            remote_tip: self.remote.tip_hash(),
            local_tip: self.local.tip_hash().await,
            snapshot,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            outcome = ?report.outcome,
            height = report.local_height,
            tip = %encode_hash(&report.local_tip),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Simulation finished"
        );
        if let Some(snapshot) = &report.snapshot {
            tracing::info!(stats = ?snapshot.stats, "Driver statistics");
        }

        Ok(report)
    }
}
