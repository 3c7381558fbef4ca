// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transport seam between the synchronizer and the wire.
//!
//! The synchronizer only sees [`SyncTransport`] and [`SyncConnection`], so
//! tests drive it with scripted connections while production uses the
//! WebSocket implementation below.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::warn;

use ticketflow_core::{ClientEvent, ServerEvent, TicketflowError};

/// Factory for connections to the event broadcaster.
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SyncConnection>, TicketflowError>;
}

/// One live connection. Dropped on disconnect; the transport makes a fresh
/// one for each reconnection attempt.
#[async_trait]
pub trait SyncConnection: Send {
    /// Sends one client event.
    async fn send(&mut self, event: &ClientEvent) -> Result<(), TicketflowError>;

    /// Receives the next server event. `Ok(None)` signals a clean close;
    /// `Err` signals a transport failure. Both start reconnection.
    async fn recv(&mut self) -> Result<Option<ServerEvent>, TicketflowError>;
}

/// WebSocket transport speaking the gateway's JSON protocol.
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SyncTransport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn SyncConnection>, TicketflowError> {
        let (stream, _response) =
            connect_async(&self.url)
                .await
                .map_err(|e| TicketflowError::Transport {
                    message: format!("failed to connect to {}: {e}", self.url),
                    source: Some(Box::new(e)),
                })?;
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl SyncConnection for WsConnection {
    async fn send(&mut self, event: &ClientEvent) -> Result<(), TicketflowError> {
        let text = serde_json::to_string(event).map_err(|e| TicketflowError::Transport {
            message: format!("failed to serialize client event: {e}"),
            source: Some(Box::new(e)),
        })?;
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TicketflowError::Transport {
                message: format!("send failed: {e}"),
                source: Some(Box::new(e)),
            })
    }

    async fn recv(&mut self) -> Result<Option<ServerEvent>, TicketflowError> {
        loop {
            let msg = match self.stream.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    return Err(TicketflowError::Transport {
                        message: format!("receive failed: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
                None => return Ok(None),
            };
            match msg {
                Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => return Ok(Some(event)),
                    // Closed tagged union: unknown kinds are dropped.
                    Err(e) => warn!("unrecognized server event dropped: {e}"),
                },
                Message::Close(_) => return Ok(None),
                // Protocol-level ping/pong frames are answered by tungstenite.
                _ => {}
            }
        }
    }
}
