// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket handler for the bidirectional event protocol.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "create_ticket", "subject": "Suspicious email", "timestamp": "..."}
//! {"type": "ping", "timestamp": "..."}
//! ```
//!
//! Server -> Client (JSON): `workflow_update`, `log_update`,
//! `workflow_error`, `system_error`, `pong`. Events produced before the
//! socket connected are not replayed; clients take a snapshot from
//! `GET /api/tickets` first.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

use ticketflow_core::{ClientEvent, ServerEvent};

use crate::server::GatewayState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// Spawns two tasks:
/// 1. Sender task: serializes outgoing events onto the socket
/// 2. Forward task: pipes broadcast events into the sender
///
/// The receiver loop runs inline, so closing the socket tears everything
/// down.
async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Per-socket outgoing queue. Direct replies (pong, errors) and the
    // broadcast feed are merged here.
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(64);

    let sender_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!("failed to serialize outbound event: {e}");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut events = state.orchestrator.broadcaster().subscribe();
    let forward_tx = tx.clone();
    let forward_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if forward_tx.send(event).await.is_err() {
                        break;
                    }
                }
                // Missed events are recovered by the snapshot endpoint.
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "observer lagged behind the event stream");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => handle_client_text(&state, &tx, &text).await,
            Message::Close(_) => break,
            _ => {} // Ignore binary; ping/pong frames are handled by the protocol layer.
        }
    }

    sender_task.abort();
    forward_task.abort();
}

/// Dispatch one client text frame.
///
/// Unknown or malformed event kinds are logged and dropped; the connection
/// stays up.
async fn handle_client_text(state: &GatewayState, tx: &mpsc::Sender<ServerEvent>, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("unrecognized client event dropped: {e}");
            return;
        }
    };

    match event {
        ClientEvent::CreateTicket { subject, .. } => {
            if let Err(err) = state.orchestrator.submit(&subject) {
                tracing::warn!(error = %err, "ticket creation rejected");
                let _ = tx
                    .send(ServerEvent::SystemError {
                        error: err.code().to_string(),
                        message: err.to_string(),
                        component: "gateway".to_string(),
                    })
                    .await;
            }
        }
        ClientEvent::Ping { .. } => {
            let _ = tx
                .send(ServerEvent::Pong {
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
                .await;
        }
    }
}
