use actix_web::{HttpResponse, Responder, get, post, web};

use super::models::{AddPeerRequest, AppState};

/// Addresses of the currently open peer connections.
#[get("/peers/")]
pub async fn get_peers(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.node.list_peers())
}

/// Dial a peer by `ws://host:port` address.
#[post("/addPeer/")]
pub async fn add_peer(
    state: web::Data<AppState>,
    req: web::Json<AddPeerRequest>,
) -> impl Responder {
    let peer = req.peer.trim();
    if peer.is_empty() {
        return HttpResponse::BadRequest().body("peer required");
    }
    match state.node.connect_to_peer(peer).await {
        Ok(()) => HttpResponse::Ok().finish(),
        Err(e) => HttpResponse::BadGateway().body(e.to_string()),
    }
}
