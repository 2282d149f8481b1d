//! Proof-of-Work nonce search.
//!
//! The search is a plain linear scan from nonce 0 with no upper bound.
//! It never touches the chain store; callers pass an `abort` predicate
//! (polled every `ABORT_CHECK_INTERVAL` nonces) to give up early when
//! the head it was built on is no longer current.

use log::debug;

use crate::blockchain::Block;
use crate::blockchain::block::{calculate_hash, hash_matches_difficulty};

/// How many hashes are computed between two `abort` polls.
pub const ABORT_CHECK_INTERVAL: u64 = 4096;

/// Search for a nonce that makes `candidate` satisfy its difficulty.
/// Returns `None` if `abort` fired first.
pub fn seal(mut candidate: Block, abort: impl Fn() -> bool) -> Option<Block> {
    let mut nonce: u64 = 0;
    loop {
        if nonce % ABORT_CHECK_INTERVAL == 0 && nonce > 0 && abort() {
            debug!(
                "abandoned search for block #{} after {} nonces",
                candidate.index, nonce
            );
            return None;
        }
        let hash = calculate_hash(
            candidate.index,
            &candidate.previous_hash,
            candidate.timestamp,
            &candidate.data,
            candidate.difficulty,
            nonce,
        );
        if hash_matches_difficulty(&hash, candidate.difficulty) {
            candidate.nonce = nonce;
            candidate.hash = hash;
            return Some(candidate);
        }
        nonce = nonce.wrapping_add(1);
    }
}

/// Build a block on top of `head` and mine it.
pub fn mine_block(
    head: &Block,
    data: String,
    difficulty: u32,
    timestamp: i64,
    abort: impl Fn() -> bool,
) -> Option<Block> {
    seal(Block::candidate(head, timestamp, data, difficulty), abort)
}
