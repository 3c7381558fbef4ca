// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ticketflow watch` command implementation.
//!
//! Runs the client synchronizer against a running server and logs the
//! mirrored state as it changes. Useful for observing a workflow live
//! without a presentation layer.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use ticketflow_config::TicketflowConfig;
use ticketflow_core::TicketflowError;
use ticketflow_sync::{ReconnectPolicy, SyncOptions, Synchronizer, WsTransport};

/// Runs the `ticketflow watch` command until interrupted.
pub async fn run_watch(config: TicketflowConfig) -> Result<(), TicketflowError> {
    crate::serve::init_tracing(&config.log.level);

    let options = SyncOptions {
        backoff: ReconnectPolicy {
            base: Duration::from_millis(config.sync.backoff_base_ms),
            cap: Duration::from_millis(config.sync.backoff_cap_ms),
            max_attempts: config.sync.max_reconnect_attempts,
        },
        heartbeat_interval: Duration::from_secs(config.sync.heartbeat_interval_secs),
    };
    let url = format!("ws://{}:{}/ws", config.server.host, config.server.port);
    info!(url, "watching event stream");

    let cancel = CancellationToken::new();
    let sync = Synchronizer::spawn(Arc::new(WsTransport::new(url)), options, cancel.clone());
    let mut states = sync.state_changes();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                cancel.cancel();
                return Ok(());
            }
            changed = states.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let state = states.borrow().clone();
                let mirror = sync.mirror();
                info!(
                    ?state,
                    tickets = mirror.len(),
                    notifications = mirror.notifications().len(),
                    "connection state changed"
                );
            }
        }
    }
}
