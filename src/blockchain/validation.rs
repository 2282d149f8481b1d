use chrono::Utc;
use log::debug;

use super::{Block, TIMESTAMP_TOLERANCE_SECS};
use crate::error::ValidationError;

/// Check `candidate` against its predecessor at wall-clock time `now`.
///
/// The timestamp rule is a loose two-sided band, not monotonicity: a
/// block is plausible when it is no more than a minute older than its
/// predecessor and no more than a minute ahead of `now`. Both bounds
/// must hold, so a block far in the future is rejected even when it is
/// well after its predecessor. A reading that rejects only blocks
/// failing both bounds at once would accept it; that reading is not
/// used here.
pub fn validate_block(
    candidate: &Block,
    previous: &Block,
    now: i64,
) -> Result<(), ValidationError> {
    let expected = previous.index.saturating_add(1);
    if candidate.index != expected || previous.index == u64::MAX {
        return Err(ValidationError::Index {
            expected,
            found: candidate.index,
        });
    }
    if candidate.previous_hash != previous.hash {
        return Err(ValidationError::PreviousHash {
            index: candidate.index,
        });
    }
    if candidate.compute_hash() != candidate.hash {
        return Err(ValidationError::Hash {
            index: candidate.index,
        });
    }
    if !candidate.meets_difficulty() {
        return Err(ValidationError::InsufficientWork {
            index: candidate.index,
            difficulty: candidate.difficulty,
        });
    }
    // peer-supplied timestamps may sit at the ends of the i64 range
    let after_previous =
        previous.timestamp.saturating_sub(TIMESTAMP_TOLERANCE_SECS) < candidate.timestamp;
    let before_now = candidate.timestamp.saturating_sub(TIMESTAMP_TOLERANCE_SECS) < now;
    if !(after_previous && before_now) {
        return Err(ValidationError::Timestamp {
            index: candidate.index,
            timestamp: candidate.timestamp,
        });
    }
    Ok(())
}

/// Validate a whole chain from genesis at wall-clock time `now`.
pub fn validate_chain(chain: &[Block], now: i64) -> Result<(), ValidationError> {
    let first = chain.first().ok_or(ValidationError::EmptyChain)?;
    if *first != Block::genesis() {
        return Err(ValidationError::Genesis);
    }
    for pair in chain.windows(2) {
        validate_block(&pair[1], &pair[0], now)?;
    }
    Ok(())
}

pub fn is_block_valid(candidate: &Block, previous: &Block) -> bool {
    match validate_block(candidate, previous, Utc::now().timestamp()) {
        Ok(()) => true,
        Err(e) => {
            debug!("rejected block #{}: {e}", candidate.index);
            false
        }
    }
}

pub fn is_chain_valid(chain: &[Block]) -> bool {
    match validate_chain(chain, Utc::now().timestamp()) {
        Ok(()) => true,
        Err(e) => {
            debug!("rejected chain of {} blocks: {e}", chain.len());
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::miner;

    /// Build a valid chain of `len` blocks mined at `difficulty`, one
    /// block every ten seconds starting at `start`.
    pub(crate) fn mined_chain(len: usize, difficulty: u32, start: i64) -> Vec<Block> {
        let mut chain = vec![Block::genesis()];
        while chain.len() < len {
            let prev = chain.last().unwrap();
            let ts = start + 10 * prev.index as i64;
            let block = Block::candidate(prev, ts, format!("block {}", prev.index + 1), difficulty);
            chain.push(miner::seal(block, || false).unwrap());
        }
        chain
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn mined_chain_is_valid() {
        let chain = mined_chain(5, 4, now() - 100);
        assert!(is_chain_valid(&chain));
        assert!(is_block_valid(&chain[4], &chain[3]));
    }

    #[test]
    fn empty_chain_is_invalid() {
        assert_eq!(validate_chain(&[], now()), Err(ValidationError::EmptyChain));
    }

    #[test]
    fn wrong_genesis_is_invalid_even_if_rest_links() {
        let mut fake = Block::genesis();
        fake.data = "not genesis".into();
        fake.hash = fake.compute_hash();
        let next = miner::seal(Block::candidate(&fake, now(), "x".into(), 0), || false).unwrap();
        let chain = vec![fake, next];
        assert_eq!(validate_chain(&chain, now()), Err(ValidationError::Genesis));
    }

    #[test]
    fn any_mutated_field_breaks_the_chain() {
        let chain = mined_chain(4, 4, now() - 100);
        let mutations: [fn(&mut Block); 7] = [
            |b| b.index += 1,
            |b| b.hash = "00".repeat(32),
            |b| b.previous_hash.push('0'),
            |b| b.timestamp += 1,
            |b| b.data.push('!'),
            |b| b.difficulty += 1,
            |b| b.nonce += 1,
        ];
        for target in 1..chain.len() {
            for mutate in &mutations {
                let mut tampered = chain.clone();
                mutate(&mut tampered[target]);
                assert!(!is_chain_valid(&tampered), "block {target} mutation accepted");
            }
        }
    }

    #[test]
    fn rejects_index_gap() {
        let chain = mined_chain(3, 0, now() - 100);
        let err = validate_block(&chain[2], &chain[0], now()).unwrap_err();
        assert_eq!(err, ValidationError::Index { expected: 1, found: 2 });
    }

    #[test]
    fn rejects_insufficient_work() {
        let g = Block::genesis();
        let mut b = Block::candidate(&g, now(), "x".into(), 1);
        while b.meets_difficulty() {
            b.nonce += 1;
            b.hash = b.compute_hash();
        }
        assert_eq!(
            validate_block(&b, &g, now()),
            Err(ValidationError::InsufficientWork { index: 1, difficulty: 1 })
        );
    }

    fn block_at(previous: &Block, timestamp: i64) -> Block {
        miner::seal(Block::candidate(previous, timestamp, "t".into(), 0), || false).unwrap()
    }

    #[test]
    fn timestamp_band_is_loose_not_monotonic() {
        let now = 1_000_000;
        let mut prev = Block::genesis();
        prev.timestamp = now - 30;

        // slightly before the predecessor is fine
        assert!(validate_block(&block_at(&prev, now - 80), &prev, now).is_ok());
        // a minute or more before the predecessor is not
        assert!(matches!(
            validate_block(&block_at(&prev, now - 90), &prev, now),
            Err(ValidationError::Timestamp { .. })
        ));
        // up to a minute in the future is fine
        assert!(validate_block(&block_at(&prev, now + 59), &prev, now).is_ok());
        assert!(matches!(
            validate_block(&block_at(&prev, now + 60), &prev, now),
            Err(ValidationError::Timestamp { .. })
        ));
    }

    #[test]
    fn future_block_is_rejected_even_when_after_predecessor() {
        let now = 1_000_000;
        let mut prev = Block::genesis();
        prev.timestamp = now;
        let block = block_at(&prev, now + 3_600);
        assert!(matches!(
            validate_block(&block, &prev, now),
            Err(ValidationError::Timestamp { .. })
        ));
    }

    #[test]
    fn extreme_timestamps_are_rejected_not_overflowed() {
        let now = now();
        let genesis = Block::genesis();
        for timestamp in [i64::MIN, i64::MIN + 1, i64::MAX, i64::MAX - 1] {
            let block = block_at(&genesis, timestamp);
            assert!(
                matches!(
                    validate_block(&block, &genesis, now),
                    Err(ValidationError::Timestamp { .. })
                ),
                "accepted timestamp {timestamp}"
            );
            assert!(!is_chain_valid(&[genesis.clone(), block]));
        }
    }

    #[test]
    fn predecessor_at_range_edge_does_not_overflow() {
        let mut prev = Block::genesis();
        prev.timestamp = i64::MIN;
        assert!(validate_block(&block_at(&prev, 0), &prev, 0).is_ok());

        prev.index = u64::MAX;
        let mut block = block_at(&Block::genesis(), 0);
        block.index = u64::MAX;
        assert!(matches!(
            validate_block(&block, &prev, 0),
            Err(ValidationError::Index { .. })
        ));
    }
}
