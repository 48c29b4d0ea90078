//! Push channel WebSocket endpoint.
//!
//! # Responsibilities
//! - Complete the upgrade handshake with the browser
//! - Forward push channel broadcasts as text frames
//! - Republish client text frames as inbound push events
//!
//! # Data Flow
//! ```text
//! PushChannel::broadcast ──→ text frame ──→ Browser
//! PushChannel inbound    ←── text frame ←── Browser
//! ```
//!
//! # Design Decisions
//! - Frame-level forwarding (no message buffering beyond the channel)
//! - A lagging client skips missed messages and stays connected
//! - Ping/pong handled by the WebSocket runtime

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::http::server::AppState;
use crate::push::PushChannel;

/// Upgrade handler mounted at the configured push path.
pub async fn push_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let channel = state.push.clone();
    ws.on_upgrade(move |socket| serve_client(socket, channel))
}

async fn serve_client(socket: WebSocket, channel: PushChannel) {
    let (guard, mut feed) = channel.connect();
    let client_id = guard.id();
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outbound = feed.recv() => match outbound {
                Ok(text) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(client_id = %client_id, skipped, "Push client lagging");
                }
                Err(RecvError::Closed) => break,
            },
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    channel.publish_inbound(client_id, text.to_string());
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(client_id = %client_id, error = %e, "Push socket error");
                    break;
                }
            },
        }
    }

    let _ = sink.close().await;
}
