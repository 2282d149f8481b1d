pub mod block;
pub mod difficulty;
pub mod store;
pub mod validation;

pub use block::Block;
pub use difficulty::next_difficulty;
pub use store::ChainStore;
pub use validation::{is_block_valid, is_chain_valid};

/// Expected seconds between two blocks.
pub const BLOCK_GENERATION_INTERVAL: i64 = 10;

/// Difficulty is re-evaluated every this many blocks.
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u64 = 10;

/// Width of the timestamp plausibility band, in seconds.
pub const TIMESTAMP_TOLERANCE_SECS: i64 = 60;
