use serde::{Deserialize, Serialize};

use crate::node::Node;

/// Shared application state: a handle onto the running node.
pub struct AppState {
    pub node: Node,
}

impl AppState {
    pub fn new(node: Node) -> Self {
        Self { node }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Deserialize, Default)]
pub struct MineRequest {
    #[serde(default)]
    pub data: String,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct AddPeerRequest {
    pub peer: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub next_difficulty: u32,
    pub block_generation_interval_secs: i64,
    pub adjustment_interval: u64,
    pub last_interval_secs: Option<i64>,
    pub avg_interval_secs: Option<f64>,
    pub peers: usize,
}
