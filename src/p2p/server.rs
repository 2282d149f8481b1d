//! WebSocket transport for peer connections.
//!
//! Each connection runs a reader loop feeding `Node::handle_frame` and a
//! writer task draining the peer's outbound queue, so a slow peer only
//! ever backs up its own queue.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{WebSocketStream, accept_async, connect_async};

use super::{Message, OUTBOUND_QUEUE_SIZE};
use crate::error::{NodeError, NodeResult};
use crate::node::Node;

/// Bind the peer listener and accept connections in the background.
/// Returns the bound address.
pub async fn listen(node: Node, addr: impl ToSocketAddrs) -> NodeResult<SocketAddr> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tokio::spawn(accept_loop(node, listener));
    Ok(local)
}

async fn accept_loop(node: Node, listener: TcpListener) {
    loop {
        match listener.accept().await {
            Ok((stream, remote)) => {
                let node = node.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => run_connection(node, ws, remote.to_string()).await,
                        Err(e) => warn!("WebSocket handshake with {remote} failed: {e}"),
                    }
                });
            }
            Err(e) => warn!("failed to accept peer connection: {e}"),
        }
    }
}

/// Dial `address` (a `ws://` URL). No retry on failure.
pub async fn connect(node: Node, address: &str) -> NodeResult<()> {
    let (ws, _) = connect_async(address).await.map_err(|e| {
        warn!("connection to peer {address} failed: {e}");
        NodeError::PeerDial {
            address: address.to_string(),
            reason: e.to_string(),
        }
    })?;
    info!("connected to peer {address}");
    tokio::spawn(run_connection(node, ws, address.to_string()));
    Ok(())
}

async fn run_connection<S>(node: Node, ws: WebSocketStream<S>, address: String)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sink, mut stream) = ws.split();
    let (outbound, mut queue) = mpsc::channel::<Message>(OUTBOUND_QUEUE_SIZE);
    let peer = node.on_connected(address.clone(), outbound);

    let writer_address = address.clone();
    let writer = tokio::spawn(async move {
        while let Some(message) = queue.recv().await {
            let frame = match message.encode() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("could not encode message for {writer_address}: {e}");
                    continue;
                }
            };
            if let Err(e) = sink.send(Frame::text(frame)).await {
                debug!("send to {writer_address} failed: {e}");
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Frame::Text(text)) => node.handle_frame(peer, text.as_str()),
            Ok(Frame::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("connection error with peer {address}: {e}");
                break;
            }
        }
    }

    node.on_disconnected(peer);
    writer.abort();
    info!("connection closed with peer {address}");
}
