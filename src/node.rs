use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task;

use crate::blockchain::{Block, ChainStore};
use crate::error::NodeResult;
use crate::miner;
use crate::p2p::{self, Message, PeerId, PeerSet, Reconciliation, reconcile};

/// One ledger node: the chain store plus the open peer connections.
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct Node {
    store: Arc<ChainStore>,
    peers: Arc<PeerSet>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_store(store: ChainStore) -> Self {
        Self {
            store: Arc::new(store),
            peers: Arc::default(),
        }
    }

    pub fn store(&self) -> &ChainStore {
        &self.store
    }

    pub fn chain(&self) -> Vec<Block> {
        self.store.current()
    }

    pub fn list_peers(&self) -> Vec<String> {
        self.peers.addresses()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Dial a peer and run the same handshake as for inbound peers.
    pub async fn connect_to_peer(&self, address: &str) -> NodeResult<()> {
        p2p::server::connect(self.clone(), address).await
    }

    /// Mine a block carrying `data` on top of the current head.
    ///
    /// The nonce search runs on the blocking pool and only looks at the
    /// store's generation counter while searching. If the head moves
    /// (a peer block arrived) the search is abandoned and restarted on
    /// the new head, so the returned block is always part of the chain.
    pub async fn mine(&self, data: String) -> NodeResult<Block> {
        loop {
            let tip = self.store.tip();
            let index = tip.head.index + 1;
            debug!("mining block #{index} at difficulty {}", tip.next_difficulty);

            let store = Arc::clone(&self.store);
            let payload = data.clone();
            let timestamp = Utc::now().timestamp();
            let mined = task::spawn_blocking(move || {
                miner::mine_block(&tip.head, payload, tip.next_difficulty, timestamp, || {
                    store.generation() != tip.generation
                })
            })
            .await?;

            let Some(block) = mined else {
                info!("chain head moved while mining #{index}, restarting on new head");
                continue;
            };
            if self.commit_mined(&block) {
                return Ok(block);
            }
            info!("mined block #{index} lost the race to another block, restarting");
        }
    }

    /// Append a freshly mined block and gossip it. False when the head
    /// moved after the search finished; the block is then discarded.
    fn commit_mined(&self, block: &Block) -> bool {
        if !self.store.try_append(block.clone()) {
            return false;
        }
        info!(
            "MINER - sealed block #{} (hash={}, nonce={})",
            block.index, block.hash, block.nonce
        );
        self.broadcast_latest();
        true
    }

    /// Register a freshly opened connection and ask it for its head.
    pub fn on_connected(&self, address: String, outbound: mpsc::Sender<Message>) -> PeerId {
        info!("peer connected: {address}");
        let id = self.peers.register(address, outbound);
        self.peers.send(id, Message::QueryLatest);
        id
    }

    pub fn on_disconnected(&self, peer: PeerId) {
        self.peers.remove(peer);
    }

    /// Decode and dispatch one raw frame. Malformed frames are dropped;
    /// the connection stays open.
    pub fn handle_frame(&self, from: PeerId, frame: &str) {
        match Message::decode(frame) {
            Ok(message) => self.handle_message(from, message),
            Err(e) => warn!("dropping malformed message from {from}: {e}"),
        }
    }

    pub fn handle_message(&self, from: PeerId, message: Message) {
        debug!("received message type {} from {from}", message.kind());
        match message {
            Message::QueryLatest => {
                self.peers
                    .send(from, Message::ResponseChain(vec![self.store.latest()]));
            }
            Message::QueryAll => {
                self.peers.send(from, Message::ResponseChain(self.store.current()));
            }
            Message::ResponseChain(blocks) => self.handle_chain_response(blocks),
        }
    }

    fn handle_chain_response(&self, blocks: Vec<Block>) {
        let local_head = self.store.latest();
        match reconcile(&local_head, blocks) {
            Reconciliation::Ignore(reason) => {
                debug!("received chain ignored: {reason:?}");
            }
            Reconciliation::Append(block) => {
                let index = block.index;
                if self.store.try_append(block) {
                    info!("appended block #{index} received from peer");
                    self.broadcast_latest();
                }
            }
            Reconciliation::QueryAll => {
                info!("received head does not link to ours, querying full chains");
                self.peers.broadcast(&Message::QueryAll);
            }
            Reconciliation::Replace(chain) => {
                if self.store.try_replace(chain) {
                    self.broadcast_latest();
                } else {
                    info!("received chain rejected");
                }
            }
        }
    }

    /// Gossip the current head to every peer.
    pub fn broadcast_latest(&self) {
        let head = self.store.latest();
        let delivered = self
            .peers
            .broadcast(&Message::ResponseChain(vec![head]));
        debug!("broadcast head to {delivered} peer(s)");
    }
}
