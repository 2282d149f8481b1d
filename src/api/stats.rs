use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};
use crate::blockchain::{BLOCK_GENERATION_INTERVAL, DIFFICULTY_ADJUSTMENT_INTERVAL, next_difficulty};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let chain = state.node.chain();
    let height = chain.len();

    // genesis carries timestamp 0, so intervals only count mined blocks
    let last_interval_secs = if height >= 3 {
        Some(chain[height - 1].timestamp - chain[height - 2].timestamp)
    } else {
        None
    };

    // average over the current adjustment window
    let window = DIFFICULTY_ADJUSTMENT_INTERVAL as usize;
    let avg_interval_secs = if height > window + 1 {
        let newest = &chain[height - 1];
        let oldest = &chain[height - 1 - window];
        Some((newest.timestamp - oldest.timestamp) as f64 / window as f64)
    } else {
        None
    };

    HttpResponse::Ok().json(StatsResponse {
        height,
        next_difficulty: next_difficulty(&chain),
        block_generation_interval_secs: BLOCK_GENERATION_INTERVAL,
        adjustment_interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
        last_interval_secs,
        avg_interval_secs,
        peers: state.node.peer_count(),
    })
}
