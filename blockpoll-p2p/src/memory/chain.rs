//! In-memory chain service and locator provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use blockpoll_core::{encode_hash, Block, BlockLocator, Hash};

use crate::chain::{ChainService, LocatorProvider, StoreOutcome};
use crate::error::{ChainError, ChainResult};

/// Number of block locator hashes to build.
pub const LOCATOR_DEPTH: usize = 32;

/// Default maximum number of blocks held in the orphan pool.
pub const DEFAULT_MAX_ORPHANS: usize = 10_000;

/// Predicate deciding whether a block is valid.
type Acceptor = Box<dyn Fn(&Block) -> bool + Send + Sync>;

/// A block with its height.
#[derive(Debug, Clone)]
struct StoredBlock {
    block: Block,
    height: u64,
}

#[derive(Debug, Default)]
struct ChainInner {
    /// All connected blocks by hash.
    blocks: HashMap<Hash, StoredBlock>,
    /// Best chain, indexed by height.
    main_chain: Vec<Hash>,
    /// Orphan blocks indexed by parent hash.
    orphans: HashMap<Hash, Vec<Block>>,
    /// Hashes of all blocks in `orphans`.
    orphan_hashes: HashSet<Hash>,
}

impl ChainInner {
    fn tip_height(&self) -> u64 {
        self.main_chain.len().saturating_sub(1) as u64
    }

    /// Connect a block whose parent is known.
    fn insert(&mut self, hash: Hash, block: Block, height: u64) {
        self.blocks.insert(hash, StoredBlock { block, height });
        if height > self.tip_height() {
            self.set_tip(hash);
        }
    }

    /// Make `tip` the head of the best chain, rewriting the height index
    /// back to the fork point.
    fn set_tip(&mut self, tip: Hash) {
        let mut branch = Vec::new();
        let mut cursor = tip;

        while let Some(stored) = self.blocks.get(&cursor) {
            let height = stored.height as usize;
            if self.main_chain.get(height) == Some(&cursor) {
                self.main_chain.truncate(height + 1);
                break;
            }
            branch.push(cursor);
            if height == 0 {
                self.main_chain.clear();
                break;
            }
            cursor = stored.block.parent_hash();
        }

        self.main_chain.extend(branch.into_iter().rev());
    }

    fn add_orphan(&mut self, hash: Hash, block: Block, max_orphans: usize) {
        if self.orphan_hashes.len() >= max_orphans {
            tracing::debug!(hash = %encode_hash(&hash), "Orphan pool full, discarding block");
            return;
        }
        self.orphan_hashes.insert(hash);
        self.orphans.entry(block.parent_hash()).or_default().push(block);
    }

    /// Connect every orphan that descends from `root`. Returns how many were
    /// connected.
    fn connect_orphans(&mut self, root: Hash) -> usize {
        let mut connected = 0;
        let mut parents = vec![root];

        while let Some(parent) = parents.pop() {
            let Some(children) = self.orphans.remove(&parent) else {
                continue;
            };
            let Some(parent_height) = self.blocks.get(&parent).map(|p| p.height) else {
                continue;
            };
            for child in children {
                let hash = child.hash();
                self.orphan_hashes.remove(&hash);
                self.insert(hash, child, parent_height + 1);
                parents.push(hash);
                connected += 1;
            }
        }

        connected
    }
}

/// Build a block locator from a best chain indexed by height.
///
/// Returns hashes at exponentially increasing distances from the tip:
/// tip, tip-1, ..., tip-9, tip-11, tip-15, tip-23, ... genesis
pub fn build_block_locator(main_chain: &[Hash]) -> ChainResult<BlockLocator> {
    let mut locator = Vec::with_capacity(LOCATOR_DEPTH + 1);
    let Some(genesis) = main_chain.first().copied() else {
        return Ok(BlockLocator::new(locator)?);
    };

    let mut height = main_chain.len() - 1;
    let mut step = 1;

    loop {
        locator.push(main_chain[height]);

        if height == 0 || locator.len() >= LOCATOR_DEPTH {
            break;
        }

        // Dense near the tip, sparse further back
        if locator.len() >= 10 {
            step *= 2;
        }

        height = height.saturating_sub(step);
    }

    // Always include genesis
    if locator.last() != Some(&genesis) {
        locator.push(genesis);
    }

    Ok(BlockLocator::new(locator)?)
}

/// In-memory block store with an orphan pool.
///
/// Blocks whose parent is known are connected immediately; the longest
/// chain is the best chain. Blocks with an unknown parent wait in the orphan
/// pool and are connected as soon as their parent is.
pub struct MemoryChain {
    inner: RwLock<ChainInner>,
    genesis_hash: Hash,
    max_orphans: usize,
    acceptor: Option<Acceptor>,
    locator_available: AtomicBool,
}

impl MemoryChain {
    /// Create a chain holding only `genesis`.
    pub fn new(genesis: Block) -> Self {
        let genesis_hash = genesis.hash();
        let mut inner = ChainInner::default();
        inner.blocks.insert(
            genesis_hash,
            StoredBlock {
                block: genesis,
                height: 0,
            },
        );
        inner.main_chain.push(genesis_hash);

        Self {
            inner: RwLock::new(inner),
            genesis_hash,
            max_orphans: DEFAULT_MAX_ORPHANS,
            acceptor: None,
            locator_available: AtomicBool::new(true),
        }
    }

    /// Set the orphan pool capacity.
    pub fn with_max_orphans(mut self, max: usize) -> Self {
        self.max_orphans = max;
        self
    }

    /// Reject every block for which `accept` returns false.
    pub fn with_acceptor<F>(mut self, accept: F) -> Self
    where
        F: Fn(&Block) -> bool + Send + Sync + 'static,
    {
        self.acceptor = Some(Box::new(accept));
        self
    }

    /// Make locator fetches fail (`false`) or succeed (`true`).
    pub fn set_locator_available(&self, available: bool) {
        self.locator_available.store(available, Ordering::SeqCst);
    }

    /// Genesis block hash.
    pub fn genesis_hash(&self) -> Hash {
        self.genesis_hash
    }

    /// Height of the best chain tip.
    pub async fn height(&self) -> u64 {
        self.inner.read().await.tip_height()
    }

    /// Hash of the best chain tip.
    pub async fn tip_hash(&self) -> Hash {
        let inner = self.inner.read().await;
        inner.main_chain.last().copied().unwrap_or(self.genesis_hash)
    }

    /// Check if a block is connected.
    pub async fn has_block(&self, hash: &Hash) -> bool {
        self.inner.read().await.blocks.contains_key(hash)
    }

    /// Number of blocks waiting in the orphan pool.
    pub async fn orphan_count(&self) -> usize {
        self.inner.read().await.orphan_hashes.len()
    }
}

#[async_trait]
impl ChainService for MemoryChain {
    async fn store(&self, block: Block) -> ChainResult<StoreOutcome> {
        let hash = block.hash();
        let mut inner = self.inner.write().await;

        if inner.blocks.contains_key(&hash) {
            return Err(ChainError::Duplicate { hash });
        }
        if inner.orphan_hashes.contains(&hash) {
            return Ok(StoreOutcome::Orphan);
        }
        if let Some(accept) = &self.acceptor {
            if !accept(&block) {
                return Ok(StoreOutcome::Rejected);
            }
        }

        let Some(parent_height) = inner.blocks.get(&block.parent_hash()).map(|p| p.height) else {
            inner.add_orphan(hash, block, self.max_orphans);
            return Ok(StoreOutcome::Orphan);
        };

        let height = parent_height + 1;
        inner.insert(hash, block, height);

        let connected = inner.connect_orphans(hash);
        if connected > 0 {
            tracing::debug!(
                parent = %encode_hash(&hash),
                connected,
                tip = inner.tip_height(),
                "Connected orphan blocks"
            );
        }

        Ok(StoreOutcome::Confirmed { height })
    }
}

#[async_trait]
impl LocatorProvider for MemoryChain {
    async fn fetch_locator(&self) -> ChainResult<BlockLocator> {
        if !self.locator_available.load(Ordering::SeqCst) {
            return Err(ChainError::LocatorUnavailable("chain is not serving locators".to_string()));
        }
        let inner = self.inner.read().await;
        build_block_locator(&inner.main_chain)
    }
}
