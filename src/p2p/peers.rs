use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use super::Message;

/// A live connection. Peers have no identity beyond it.
pub type PeerId = Uuid;

struct Peer {
    address: String,
    outbound: mpsc::Sender<Message>,
}

/// Open connections and their outbound queues. Sends never block: a
/// full or closed queue drops the message for that peer only.
#[derive(Default)]
pub struct PeerSet {
    peers: Mutex<HashMap<PeerId, Peer>>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PeerId, Peer>> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, address: String, outbound: mpsc::Sender<Message>) -> PeerId {
        let id = Uuid::new_v4();
        debug!("registered peer {address} as {id}");
        self.lock().insert(id, Peer { address, outbound });
        id
    }

    pub fn remove(&self, id: PeerId) -> bool {
        self.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.lock().values().map(|p| p.address.clone()).collect();
        addresses.sort();
        addresses
    }

    /// Queue `message` for one peer.
    pub fn send(&self, id: PeerId, message: Message) -> bool {
        let peers = self.lock();
        match peers.get(&id) {
            Some(peer) => enqueue(peer, message),
            None => false,
        }
    }

    /// Queue `message` for every peer. Returns how many accepted it.
    pub fn broadcast(&self, message: &Message) -> usize {
        self.lock()
            .values()
            .filter(|peer| enqueue(peer, message.clone()))
            .count()
    }
}

fn enqueue(peer: &Peer, message: Message) -> bool {
    match peer.outbound.try_send(message) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("outbound queue full for {}, dropping message", peer.address);
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!("peer {} already closed", peer.address);
            false
        }
    }
}
