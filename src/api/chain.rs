use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, DifficultyResponse, MineRequest, ValidateResponse};
use crate::blockchain::is_chain_valid;

/// Get the full chain.
#[get("/blocks/")]
pub async fn get_blocks(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.node.chain())
}

/// Re-validate the local chain from genesis.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.node.chain();
    HttpResponse::Ok().json(ValidateResponse {
        valid: is_chain_valid(&chain),
        length: chain.len(),
    })
}

/// Mine a block carrying `data` and return it once it is part of the
/// chain. The body is optional.
#[post("/mine/")]
pub async fn mine_block(
    state: web::Data<AppState>,
    req: Option<web::Json<MineRequest>>,
) -> impl Responder {
    let data = req.map(|r| r.into_inner().data).unwrap_or_default();
    match state.node.mine(data).await {
        Ok(block) => {
            info!("API - mined block #{} ({})", block.index, block.hash);
            HttpResponse::Ok().json(block)
        }
        Err(e) => {
            warn!("API - mining failed: {e}");
            HttpResponse::InternalServerError().body(e.to_string())
        }
    }
}

/// Difficulty the next block will be mined at.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: state.node.store().next_difficulty(),
    })
}
