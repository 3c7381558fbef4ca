// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side synchronization for Ticketflow.
//!
//! Maintains a local mirror of server ticket state over a lossy transport:
//! reconnection with capped exponential backoff and an explicit offline
//! mode, log deduplication against at-least-once redelivery, and an
//! offline queue so user actions survive disconnection.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use ticketflow_sync::{Synchronizer, SyncOptions, WsTransport};
//! use tokio_util::sync::CancellationToken;
//!
//! let transport = Arc::new(WsTransport::new("ws://127.0.0.1:8080/ws"));
//! let sync = Synchronizer::spawn(transport, SyncOptions::default(), CancellationToken::new());
//! sync.create_ticket("Suspicious email from CEO requesting wire transfer");
//! ```

pub mod backoff;
pub mod mirror;
pub mod queue;
pub mod synchronizer;
pub mod transport;

pub use backoff::{ReconnectPolicy, ReconnectState};
pub use mirror::{MirrorLogEntry, MirrorTicket, SystemNotification, TicketMirror, TicketOrigin};
pub use queue::OfflineQueue;
pub use synchronizer::{ConnectionState, HeartbeatStats, SyncOptions, Synchronizer};
pub use transport::{SyncConnection, SyncTransport, WsTransport};
