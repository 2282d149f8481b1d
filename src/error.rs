use thiserror::Error;

/// Reasons a block or chain is rejected. Never fatal: the offending
/// mutation simply does not happen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid index: expected {expected}, got {found}")]
    Index { expected: u64, found: u64 },

    #[error("invalid previous hash for block #{index}")]
    PreviousHash { index: u64 },

    #[error("invalid hash for block #{index}")]
    Hash { index: u64 },

    #[error("block #{index} does not satisfy difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: u32 },

    #[error("block #{index} timestamp {timestamp} outside plausibility band")]
    Timestamp { index: u64, timestamp: i64 },

    #[error("first block is not the genesis block")]
    Genesis,

    #[error("empty chain")]
    EmptyChain,
}

/// A peer frame that could not be turned into a `Message`.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown message type {0}")]
    UnknownType(u64),

    #[error("chain response without block list")]
    MissingChain,
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not connect to peer {address}: {reason}")]
    PeerDial { address: String, reason: String },

    #[error("Mining task failed: {0}")]
    MiningTask(#[from] tokio::task::JoinError),
}

pub type NodeResult<T> = std::result::Result<T, NodeError>;
