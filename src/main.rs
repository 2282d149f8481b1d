mod api;
mod blockchain;
mod config;
mod error;
mod miner;
mod node;
mod p2p;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{info, warn};

use api::AppState;
use config::NodeConfig;
use node::Node;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();
    let node = Node::new();

    let p2p_addr = p2p::server::listen(node.clone(), (config.p2p_host.as_str(), config.p2p_port))
        .await
        .map_err(std::io::Error::other)?;
    info!("P2P server listening on {p2p_addr}");

    for peer in &config.peers {
        if let Err(e) = node.connect_to_peer(peer).await {
            warn!("startup peer {peer} unreachable: {e}");
        }
    }

    println!(
        "⛓️ Starting ledger node: API at http://{}:{}, P2P on {p2p_addr}",
        config.http_host, config.http_port
    );

    let state = web::Data::new(AppState::new(node));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run()
    .await
}
