use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};

use super::{Block, is_block_valid, is_chain_valid, next_difficulty};

/// Everything the miner needs to build a candidate, read under one lock.
#[derive(Debug, Clone)]
pub struct ChainTip {
    pub head: Block,
    pub next_difficulty: u32,
    pub generation: u64,
}

/// The node's current chain. All reads are snapshots; all writes go
/// through `try_append` / `try_replace`.
#[derive(Debug)]
pub struct ChainStore {
    chain: RwLock<Vec<Block>>,
    // Bumped on every successful mutation. Readable without the lock.
    generation: AtomicU64,
}

impl Default for ChainStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainStore {
    /// Initialize the store with the genesis block only.
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(vec![Block::genesis()]),
            generation: AtomicU64::new(0),
        }
    }

    /// Start from an arbitrary chain without validating it.
    #[cfg(test)]
    pub(crate) fn from_chain_unchecked(chain: Vec<Block>) -> Self {
        Self {
            chain: RwLock::new(chain),
            generation: AtomicU64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.chain.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Block>> {
        self.chain.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the whole chain.
    pub fn current(&self) -> Vec<Block> {
        self.read().clone()
    }

    /// Return the last block in the chain.
    pub fn latest(&self) -> Block {
        self.read()
            .last()
            .cloned()
            .expect("chain always holds at least the genesis block")
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn next_difficulty(&self) -> u32 {
        next_difficulty(&self.read())
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn tip(&self) -> ChainTip {
        let chain = self.read();
        ChainTip {
            head: chain
                .last()
                .cloned()
                .expect("chain always holds at least the genesis block"),
            next_difficulty: next_difficulty(&chain),
            generation: self.generation(),
        }
    }

    /// Append `block` if it is valid on top of the current head.
    /// Returns false and leaves the chain untouched otherwise.
    pub fn try_append(&self, block: Block) -> bool {
        let mut chain = self.write();
        let Some(head) = chain.last() else {
            return false;
        };
        if !is_block_valid(&block, head) {
            return false;
        }
        debug!("appended block #{} ({})", block.index, block.hash);
        chain.push(block);
        self.generation.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Swap in `candidate` if it is a valid chain strictly longer than
    /// the current one.
    pub fn try_replace(&self, candidate: Vec<Block>) -> bool {
        // Validation is independent of local state, keep it outside the lock.
        if !is_chain_valid(&candidate) {
            return false;
        }
        let mut chain = self.write();
        if candidate.len() <= chain.len() {
            debug!(
                "candidate chain of {} blocks is not longer than local {}",
                candidate.len(),
                chain.len()
            );
            return false;
        }
        info!(
            "replacing local chain ({} blocks) with received chain ({} blocks)",
            chain.len(),
            candidate.len()
        );
        *chain = candidate;
        self.generation.fetch_add(1, Ordering::AcqRel);
        true
    }
}
