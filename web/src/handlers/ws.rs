//! WebSocket endpoints for change signals.
//!
//! - `GET /api/ws/queue/:office_id` - Signals for one office's queue.
//!   Unauthenticated: queue boards in waiting halls consume this.
//! - `GET /api/ws/my-tokens` - Signals for the caller's tokens
//!   (requires citizen identity).
//!
//! # Protocol
//!
//! Each signal is one JSON text frame:
//!
//! ```json
//! {"office_id":"rto-pune","date":"2025-01-14","owner_id":"...","token_id":"..."}
//! ```
//!
//! Signals are refresh hints, not state. Clients re-fetch the queue (or
//! their token list) on every frame; a dropped frame costs one stale
//! render until the next signal.

use crate::error::ApiError;
use crate::extractors::CitizenIdentity;
use crate::state::AppState;
use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::StreamExt;
use janseva_core::notifier::QueueTopic;
use janseva_core::types::OfficeId;

/// Upgrade to a socket streaming one office's queue signals.
pub async fn office_queue_socket(
    State(state): State<AppState>,
    Path(office_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let office_id: OfficeId = office_id
        .parse()
        .map_err(|_| ApiError::bad_request("office id must not be empty"))?;
    let topics = vec![QueueTopic::Office(office_id)];
    Ok(ws.on_upgrade(move |socket| forward_signals(socket, state, topics)))
}

/// Upgrade to a socket streaming the caller's token signals.
pub async fn my_tokens_socket(
    State(state): State<AppState>,
    CitizenIdentity(owner): CitizenIdentity,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let topics = vec![QueueTopic::Citizen(owner)];
    Ok(ws.on_upgrade(move |socket| forward_signals(socket, state, topics)))
}

/// Pump signals to the client until either side hangs up.
async fn forward_signals(mut socket: WebSocket, state: AppState, topics: Vec<QueueTopic>) {
    let mut signals = match state.engine.subscribe(topics).await {
        Ok(signals) => signals,
        Err(error) => {
            tracing::warn!(%error, "subscription failed; closing socket");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };

    loop {
        tokio::select! {
            signal = signals.next() => {
                let Some(signal) = signal else { break };
                let Ok(payload) = serde_json::to_string(&signal) else { break };
                if socket.send(Message::Text(payload)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    // Pings are answered by axum; ignore other chatter.
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
