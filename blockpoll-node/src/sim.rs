//! Simulated remote peer.
//!
//! [`SimulatedPeer`] serves a pre-generated chain through the
//! [`PeerSession`] interface, answering requests the way a full node does:
//!
//! - get-blocks: block inventory after the locator's fork point, at most
//!   `batch_size` items, ending early at the stop hash
//! - get-data: the requested blocks, optionally shuffled
//! - once the last item of a truncated batch is fetched, the peer announces
//!   its tip so the requester asks for the next batch
//!
//! Every message in either direction goes through the wire encoding. Inbound
//! events wait in per-stream queues until a handler is registered.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use blockpoll_core::{encode_hash, Block, BlockHeader, Hash, InventoryItem, NULL_HASH};
use blockpoll_p2p::peer::{
    ready_receipt, BlockHandler, InventoryHandler, PeerSession, SendReceipt, SessionId,
};
use blockpoll_p2p::protocol::{
    BlockMessage, GetBlocksMessage, GetDataMessage, InventoryMessage, Message,
};
use blockpoll_p2p::{P2pError, P2pResult};

/// Genesis block shared by the simulated peer and the local chain.
pub fn genesis_block() -> Block {
    Block::new(BlockHeader::new(NULL_HASH, 0, 0), Vec::new())
}

/// Generate `count` blocks on top of `genesis`, with random payloads.
///
/// The result starts with `genesis`, so index equals height.
pub fn generate_chain(genesis: Block, count: u64, rng: &mut StdRng) -> Vec<Block> {
    let mut chain = Vec::with_capacity(count as usize + 1);
    chain.push(genesis);

    for height in 1..=count {
        let Some(parent) = chain.last() else {
            break;
        };
        let header = BlockHeader::new(parent.hash(), parent.header.timestamp + 1, height);
        let payload = rng.gen::<[u8; 8]>().to_vec();
        chain.push(Block::new(header, payload));
    }

    chain
}

/// Encode then decode a message, as a transport would.
fn over_wire(message: &Message) -> P2pResult<Message> {
    Message::decode(&message.encode()?)
}

fn unexpected(expected: &str, got: &Message) -> P2pError {
    P2pError::MalformedMessage(format!("expected {}, got {}", expected, got.name()))
}

/// Inventory as the requester receives it.
fn receive_inventory(message: InventoryMessage) -> P2pResult<InventoryMessage> {
    match over_wire(&Message::Inventory(message))? {
        Message::Inventory(inv) => Ok(inv),
        other => Err(unexpected("inv", &other)),
    }
}

/// Block as the requester receives it.
fn receive_block(block: Block) -> P2pResult<Block> {
    match over_wire(&Message::Block(BlockMessage { block }))? {
        Message::Block(msg) => Ok(msg.block),
        other => Err(unexpected("block", &other)),
    }
}

#[derive(Default)]
struct PeerInner {
    inventory_handler: Option<InventoryHandler>,
    block_handler: Option<BlockHandler>,
    pending_inventory: VecDeque<InventoryMessage>,
    pending_blocks: VecDeque<Block>,
    /// Last hash of the most recent truncated batch.
    continue_hash: Option<Hash>,
}

/// A remote peer serving a fixed chain.
pub struct SimulatedPeer {
    id: SessionId,
    chain: Vec<Block>,
    heights: HashMap<Hash, usize>,
    batch_size: usize,
    shuffle: bool,
    rng: Mutex<StdRng>,
    inner: Mutex<PeerInner>,
}

impl SimulatedPeer {
    /// Create a peer serving `chain`, where `chain[0]` is genesis.
    pub fn new(
        id: SessionId,
        chain: Vec<Block>,
        batch_size: usize,
        shuffle: bool,
        seed: u64,
    ) -> Self {
        let heights = chain
            .iter()
            .enumerate()
            .map(|(height, block)| (block.hash(), height))
            .collect();

        Self {
            id,
            chain,
            heights,
            batch_size: batch_size.max(1),
            shuffle,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            inner: Mutex::new(PeerInner::default()),
        }
    }

    /// Height of the served chain.
    pub fn height(&self) -> u64 {
        self.chain.len().saturating_sub(1) as u64
    }

    /// Hash of the served chain's tip.
    pub fn tip_hash(&self) -> Hash {
        self.chain.last().map(Block::hash).unwrap_or(NULL_HASH)
    }

    fn lock(&self) -> MutexGuard<'_, PeerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block inventory answering a get-blocks request.
    ///
    /// Returns the items and whether the batch was cut short by the batch
    /// size.
    fn serve_get_blocks(&self, request: &GetBlocksMessage) -> (Vec<InventoryItem>, bool) {
        // First locator hash we know is the fork point; genesis otherwise
        let fork = request
            .start_hashes
            .iter()
            .find_map(|hash| self.heights.get(hash).copied())
            .unwrap_or(0);

        let mut items = Vec::new();
        for block in self.chain.iter().skip(fork + 1) {
            if items.len() >= self.batch_size {
                return (items, true);
            }
            let hash = block.hash();
            items.push(InventoryItem::block(hash));
            if !request.is_unbounded() && hash == request.stop_hash {
                break;
            }
        }

        (items, false)
    }

    /// Blocks answering a get-data request, in delivery order.
    fn serve_get_data(&self, request: &GetDataMessage) -> Vec<Block> {
        let mut blocks: Vec<Block> = request
            .inventory
            .iter()
            .filter(|item| item.is_block())
            .filter_map(|item| self.heights.get(&item.hash))
            .filter_map(|&height| self.chain.get(height).cloned())
            .collect();

        if self.shuffle {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            blocks.shuffle(&mut *rng);
        }

        blocks
    }

    fn on_get_blocks(&self, request: GetBlocksMessage) {
        let (items, truncated) = self.serve_get_blocks(&request);
        tracing::debug!(
            session = %self.id,
            stop = %encode_hash(&request.stop_hash),
            items = items.len(),
            truncated,
            "Serving block inventory"
        );

        if items.is_empty() {
            return;
        }

        {
            let mut inner = self.lock();
            // Cleared only once the tip has been announced
            if truncated {
                inner.continue_hash = items.last().map(|item| item.hash);
            }
            inner.pending_inventory.push_back(InventoryMessage { inventory: items });
        }
        self.pump_inventory();
    }

    fn on_get_data(&self, request: GetDataMessage) {
        let blocks = self.serve_get_data(&request);
        tracing::debug!(session = %self.id, blocks = blocks.len(), "Serving blocks");

        let tip = self.tip_hash();
        {
            let mut inner = self.lock();
            let continue_requested = inner
                .continue_hash
                .map(|hash| request.inventory.iter().any(|item| item.hash == hash))
                .unwrap_or(false);

            inner.pending_blocks.extend(blocks);

            if continue_requested {
                inner.continue_hash = None;
                inner.pending_inventory.push_back(InventoryMessage {
                    inventory: vec![InventoryItem::block(tip)],
                });
            }
        }
        self.pump_blocks();
        self.pump_inventory();
    }

    /// Hand the next queued inventory to the registered handler, if both
    /// exist. Handlers run outside the lock.
    fn pump_inventory(&self) {
        let (handler, message) = {
            let mut inner = self.lock();
            if inner.pending_inventory.is_empty() {
                return;
            }
            let Some(handler) = inner.inventory_handler.take() else {
                return;
            };
            let Some(message) = inner.pending_inventory.pop_front() else {
                return;
            };
            (handler, message)
        };
        handler(receive_inventory(message));
    }

    fn pump_blocks(&self) {
        let (handler, block) = {
            let mut inner = self.lock();
            if inner.pending_blocks.is_empty() {
                return;
            }
            let Some(handler) = inner.block_handler.take() else {
                return;
            };
            let Some(block) = inner.pending_blocks.pop_front() else {
                return;
            };
            (handler, block)
        };
        handler(receive_block(block));
    }
}

impl PeerSession for SimulatedPeer {
    fn id(&self) -> SessionId {
        self.id
    }

    fn send(&self, message: Message) -> SendReceipt {
        let message = match over_wire(&message) {
            Ok(message) => message,
            Err(e) => return ready_receipt(Err(e)),
        };

        match message {
            Message::GetBlocks(request) => self.on_get_blocks(request),
            Message::GetData(request) => self.on_get_data(request),
            other => {
                tracing::trace!(session = %self.id, command = other.name(), "Ignoring message");
            }
        }
        ready_receipt(Ok(()))
    }

    fn subscribe_inventory(&self, handler: InventoryHandler) {
        self.lock().inventory_handler = Some(handler);
        self.pump_inventory();
    }

    fn subscribe_block(&self, handler: BlockHandler) {
        self.lock().block_handler = Some(handler);
        self.pump_blocks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn peer(count: u64, batch_size: usize) -> SimulatedPeer {
        let mut rng = StdRng::seed_from_u64(1);
        let chain = generate_chain(genesis_block(), count, &mut rng);
        SimulatedPeer::new(SessionId::new(1), chain, batch_size, false, 1)
    }

    fn get_blocks(start: Hash, stop: Hash) -> GetBlocksMessage {
        GetBlocksMessage {
            start_hashes: vec![start],
            stop_hash: stop,
        }
    }

    /// Register an inventory handler that records what it receives.
    fn capture_inventory(peer: &SimulatedPeer) -> Arc<Mutex<Vec<InventoryMessage>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        peer.subscribe_inventory(Box::new(move |result| {
            sink.lock().unwrap().push(result.unwrap());
        }));
        seen
    }

    #[test]
    fn test_generate_chain_links() {
        let mut rng = StdRng::seed_from_u64(9);
        let chain = generate_chain(genesis_block(), 5, &mut rng);

        assert_eq!(chain.len(), 6);
        for pair in chain.windows(2) {
            assert_eq!(pair[1].parent_hash(), pair[0].hash());
        }
    }

    #[test]
    fn test_seed_changes_chain() {
        let a = generate_chain(genesis_block(), 1, &mut StdRng::seed_from_u64(1));
        let b = generate_chain(genesis_block(), 1, &mut StdRng::seed_from_u64(2));
        assert_ne!(a[1].hash(), b[1].hash());
    }

    #[test]
    fn test_get_blocks_batches() {
        let peer = peer(10, 4);

        let request = get_blocks(genesis_block().hash(), NULL_HASH);
        let (items, truncated) = peer.serve_get_blocks(&request);
        assert_eq!(items.len(), 4);
        assert!(truncated);
        assert_eq!(items[0].hash, peer.chain[1].hash());

        let request = get_blocks(peer.chain[8].hash(), NULL_HASH);
        let (items, truncated) = peer.serve_get_blocks(&request);
        assert_eq!(items.len(), 2);
        assert!(!truncated);
        assert_eq!(items[1].hash, peer.tip_hash());
    }

    #[test]
    fn test_get_blocks_stops_at_stop_hash() {
        let peer = peer(10, 500);
        let stop = peer.chain[3].hash();

        let (items, truncated) = peer.serve_get_blocks(&get_blocks(genesis_block().hash(), stop));
        assert_eq!(items.len(), 3);
        assert!(!truncated);
        assert_eq!(items[2].hash, stop);
    }

    #[test]
    fn test_unknown_locator_serves_from_genesis() {
        let peer = peer(3, 500);
        let (items, _) = peer.serve_get_blocks(&get_blocks([0xee; 32], NULL_HASH));
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_inventory_waits_for_subscriber() {
        let peer = peer(3, 500);
        let _ = peer.send(Message::GetBlocks(get_blocks(genesis_block().hash(), NULL_HASH)));

        let seen = capture_inventory(&peer);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap()[0].inventory.len(), 3);
    }

    #[test]
    fn test_continue_hash_announces_tip() {
        let peer = peer(10, 4);
        let _ = peer.send(Message::GetBlocks(get_blocks(genesis_block().hash(), NULL_HASH)));
        let first = capture_inventory(&peer);
        let batch = first.lock().unwrap()[0].clone();

        let _ = peer.send(Message::GetData(GetDataMessage {
            inventory: batch.inventory,
        }));
        let second = capture_inventory(&peer);

        assert_eq!(
            second.lock().unwrap().as_slice(),
            &[InventoryMessage {
                inventory: vec![InventoryItem::block(peer.tip_hash())],
            }]
        );
        assert_eq!(peer.lock().pending_blocks.len(), 4);
    }

    #[test]
    fn test_blocks_arrive_decoded() {
        let peer = peer(3, 500);
        let wanted = peer.chain[2].clone();
        let _ = peer.send(Message::GetData(GetDataMessage {
            inventory: vec![InventoryItem::block(wanted.hash())],
        }));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        peer.subscribe_block(Box::new(move |result| {
            sink.lock().unwrap().push(result);
        }));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap(), &wanted);
    }

    #[test]
    fn test_wire_round_trip_preserves_request() {
        let request = Message::GetBlocks(get_blocks([3u8; 32], [4u8; 32]));
        assert_eq!(over_wire(&request).unwrap(), request);
    }

    #[test]
    fn test_shuffle_keeps_blocks() {
        let mut rng = StdRng::seed_from_u64(3);
        let chain = generate_chain(genesis_block(), 20, &mut rng);
        let peer = SimulatedPeer::new(SessionId::new(1), chain.clone(), 500, true, 3);

        let request = GetDataMessage {
            inventory: chain[1..].iter().map(|b| InventoryItem::block(b.hash())).collect(),
        };
        let mut served: Vec<Hash> = peer.serve_get_data(&request).iter().map(Block::hash).collect();
        let mut expected: Vec<Hash> = chain[1..].iter().map(Block::hash).collect();
        served.sort();
        expected.sort();
        assert_eq!(served, expected);
    }
}
