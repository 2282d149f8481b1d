//! Periodic difficulty adjustment.
//!
//! Every `DIFFICULTY_ADJUSTMENT_INTERVAL` blocks the time taken by the
//! last window is compared to the expected time. Too fast by more than
//! 2x bumps the difficulty by one bit, too slow by more than 2x drops it
//! by one bit. It is a coarse step controller: it never moves by more
//! than one bit per window however far off the block rate is.

use super::{BLOCK_GENERATION_INTERVAL, Block, DIFFICULTY_ADJUSTMENT_INTERVAL};

/// Difficulty the block following the last element of `chain` must be
/// mined at.
pub fn next_difficulty(chain: &[Block]) -> u32 {
    let Some(latest) = chain.last() else {
        return 0;
    };
    let interval = DIFFICULTY_ADJUSTMENT_INTERVAL as usize;
    let at_boundary = latest.index != 0 && latest.index % DIFFICULTY_ADJUSTMENT_INTERVAL == 0;
    if !at_boundary || chain.len() < interval {
        return latest.difficulty;
    }
    adjusted_difficulty(latest, &chain[chain.len() - interval])
}

fn adjusted_difficulty(latest: &Block, window_start: &Block) -> u32 {
    let expected = BLOCK_GENERATION_INTERVAL * DIFFICULTY_ADJUSTMENT_INTERVAL as i64;
    let taken = latest.timestamp.saturating_sub(window_start.timestamp);
    if taken < expected / 2 {
        window_start.difficulty.saturating_add(1)
    } else if taken > expected * 2 {
        window_start.difficulty.saturating_sub(1)
    } else {
        window_start.difficulty
    }
}
