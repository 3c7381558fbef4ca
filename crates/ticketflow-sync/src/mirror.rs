// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local ticket mirror: the client's view of server state.
//!
//! The mirror is reconciled by a single ingestion function,
//! [`TicketMirror::apply`], which pattern-matches on the event kind and
//! applies a pure merge. The server is the source of truth: a status that
//! fails the local transition check is logged as a warning but applied
//! anyway, since rejecting it would desynchronize the mirror. This is a
//! deliberate asymmetry from server-side validation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use ticketflow_core::{
    Category, ServerEvent, Severity, TicketFailure, TicketId, TicketStatus,
};

/// Where a mirrored ticket came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketOrigin {
    /// Created or confirmed by a server event.
    Server,
    /// Created locally while offline; not yet confirmed by the server.
    Local,
}

/// One entry in a mirrored ticket's audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorLogEntry {
    pub source: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub associated_status: Option<TicketStatus>,
}

impl MirrorLogEntry {
    /// Deduplication key: `(source, message, 1-second timestamp bucket)`.
    /// Absorbs at-least-once redelivery of the same entry.
    fn dedup_key(&self) -> (&str, &str, i64) {
        (&self.source, &self.message, self.timestamp.timestamp())
    }
}

/// The client's view of one ticket. Fields the server has not sent yet stay
/// `None`; partial `workflow_update` merges leave them untouched.
#[derive(Debug, Clone)]
pub struct MirrorTicket {
    pub id: TicketId,
    pub subject: Option<String>,
    pub status: TicketStatus,
    pub category: Option<Category>,
    pub created_at: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub last_message: Option<String>,
    pub log: Vec<MirrorLogEntry>,
    pub error: Option<TicketFailure>,
    pub origin: TicketOrigin,
}

impl MirrorTicket {
    fn materialized(id: TicketId, status: TicketStatus) -> Self {
        Self {
            id,
            subject: None,
            status,
            category: None,
            created_at: None,
            retry_count: 0,
            last_message: None,
            log: Vec::new(),
            error: None,
            origin: TicketOrigin::Server,
        }
    }
}

/// A `system_error` notification, not tied to any ticket.
#[derive(Debug, Clone)]
pub struct SystemNotification {
    pub component: String,
    pub error: String,
    pub message: String,
}

/// Local mirror of ticket state, reconciled from server events.
#[derive(Debug, Default)]
pub struct TicketMirror {
    tickets: HashMap<TicketId, MirrorTicket>,
    notifications: Vec<SystemNotification>,
    local_seq: u64,
}

impl TicketMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles one server event into the mirror.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::WorkflowUpdate {
                ticket_id,
                status,
                category,
                created_at,
                message,
                retry_count,
            } => {
                let ticket = self
                    .tickets
                    .entry(ticket_id.clone())
                    .or_insert_with(|| {
                        // Creation confirmation can arrive after the first
                        // status event; materialize instead of dropping.
                        debug!(ticket_id = %ticket_id, "materializing unknown ticket");
                        MirrorTicket::materialized(ticket_id.clone(), *status)
                    });

                if ticket.status != *status && !ticket.status.can_transition_to(*status) {
                    warn!(
                        ticket_id = %ticket_id,
                        from = %ticket.status,
                        to = %status,
                        "server status skipped an edge; applying anyway"
                    );
                }
                ticket.status = *status;

                // Partial merge: absent fields leave local values untouched.
                if let Some(category) = category {
                    ticket.category = Some(*category);
                }
                if let Some(created_at) = created_at {
                    ticket.created_at = Some(*created_at);
                }
                if let Some(message) = message {
                    ticket.last_message = Some(message.clone());
                }
                if let Some(retry_count) = retry_count {
                    ticket.retry_count = *retry_count;
                }
            }
            ServerEvent::LogUpdate {
                ticket_id,
                source,
                message,
                timestamp,
                associated_status,
                severity,
            } => {
                let entry = MirrorLogEntry {
                    source: source.clone(),
                    message: message.clone(),
                    severity: *severity,
                    timestamp: *timestamp,
                    associated_status: *associated_status,
                };
                let ticket = self
                    .tickets
                    .entry(ticket_id.clone())
                    .or_insert_with(|| {
                        MirrorTicket::materialized(ticket_id.clone(), TicketStatus::Received)
                    });
                let duplicate = ticket
                    .log
                    .iter()
                    .any(|existing| existing.dedup_key() == entry.dedup_key());
                if duplicate {
                    debug!(ticket_id = %ticket_id, "duplicate log entry dropped");
                } else {
                    ticket.log.push(entry);
                }
            }
            ServerEvent::WorkflowError {
                ticket_id,
                error,
                message,
            } => {
                let ticket = self
                    .tickets
                    .entry(ticket_id.clone())
                    .or_insert_with(|| {
                        MirrorTicket::materialized(ticket_id.clone(), TicketStatus::Failed)
                    });
                ticket.status = TicketStatus::Failed;
                ticket.error = Some(TicketFailure {
                    code: error.clone(),
                    message: message.clone(),
                });
            }
            ServerEvent::SystemError {
                error,
                message,
                component,
            } => {
                self.notifications.push(SystemNotification {
                    component: component.clone(),
                    error: error.clone(),
                    message: message.clone(),
                });
            }
            // Heartbeat acknowledgments are handled by the synchronizer.
            ServerEvent::Pong { .. } => {}
        }
    }

    /// Materializes a locally-originated ticket for immediate feedback while
    /// offline. Not confirmed by the server until reconnection replays the
    /// queued creation.
    pub fn materialize_local(&mut self, subject: &str) -> TicketId {
        self.local_seq += 1;
        let id = TicketId(format!("LOCAL-{:04}", self.local_seq));
        self.tickets.insert(
            id.clone(),
            MirrorTicket {
                id: id.clone(),
                subject: Some(subject.to_string()),
                status: TicketStatus::Received,
                category: None,
                created_at: Some(Utc::now()),
                retry_count: 0,
                last_message: Some("Queued locally; waiting for connection".to_string()),
                log: Vec::new(),
                error: None,
                origin: TicketOrigin::Local,
            },
        );
        id
    }

    pub fn get(&self, id: &TicketId) -> Option<&MirrorTicket> {
        self.tickets.get(id)
    }

    pub fn tickets(&self) -> impl Iterator<Item = &MirrorTicket> {
        self.tickets.values()
    }

    pub fn notifications(&self) -> &[SystemNotification] {
        &self.notifications
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
