// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fan-out of protocol events to all connected observers.
//!
//! Built on [`tokio::sync::broadcast`]: delivery is at-least-once per
//! connected observer (a lagged receiver is told how many events it missed
//! and resynchronizes via the snapshot endpoint). Events for a single ticket
//! are produced by a single orchestration run and the channel is FIFO, so a
//! connected observer sees them in production order. No ordering is
//! guaranteed across different tickets, and nothing is delivered across a
//! disconnect -- reconnection and resync are the client's burden.

use tokio::sync::broadcast;

use ticketflow_core::{LogEntry, ServerEvent, Ticket, TicketId, TicketflowError};

/// Default channel capacity; slow observers past this lag and resync.
const DEFAULT_CAPACITY: usize = 256;

/// Fan-out channel pushing workflow status changes and log lines to all
/// connected observers.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Registers a new observer. Events produced before subscription are not
    /// replayed; late joiners take a store snapshot first.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Pushes one event to every connected observer.
    ///
    /// Having no observers is not an error: processing continues and the
    /// audit trail in the store stays complete.
    pub fn emit(&self, event: ServerEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::trace!(error = %err, "no observers connected, event dropped");
        }
    }

    /// Emits a full-snapshot `workflow_update` for the ticket.
    pub fn workflow_update(&self, ticket: &Ticket) {
        self.emit(ServerEvent::workflow_update(ticket));
    }

    /// Emits a `log_update` for an appended entry.
    pub fn log_update(&self, ticket_id: &TicketId, entry: &LogEntry) {
        self.emit(ServerEvent::log_update(ticket_id, entry));
    }

    /// Emits a ticket-scoped `workflow_error`.
    pub fn workflow_error(&self, ticket_id: &TicketId, error: &TicketflowError) {
        self.emit(ServerEvent::WorkflowError {
            ticket_id: ticket_id.clone(),
            error: error.code().to_string(),
            message: error.to_string(),
        });
    }

    /// Emits a non-ticket-scoped `system_error` notification.
    pub fn system_error(&self, component: &str, error: &TicketflowError) {
        self.emit(ServerEvent::SystemError {
            error: error.code().to_string(),
            message: error.to_string(),
            component: component.to_string(),
        });
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
