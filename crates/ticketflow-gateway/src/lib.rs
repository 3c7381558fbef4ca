// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP and WebSocket gateway for the Ticketflow workflow engine.
//!
//! Exposes snapshot endpoints (`/health`, `/api/status`, `/api/tickets`)
//! and the live event stream (`/ws`) over a single axum server.

pub mod handlers;
pub mod server;
pub mod ws;

pub use server::{router, start_server, GatewayState, ServerConfig};
