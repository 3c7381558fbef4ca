// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bidirectional event protocol spoken over the persistent gateway
//! connection.
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "create_ticket", "subject": "VPN is down", "timestamp": "..."}
//! {"type": "ping", "timestamp": "..."}
//! ```
//!
//! Server -> Client (JSON):
//! ```json
//! {"type": "workflow_update", "ticket_id": "SIM-1A2B3C4D", "status": "working", ...}
//! {"type": "log_update", "ticket_id": "SIM-1A2B3C4D", "source": "...", ...}
//! {"type": "workflow_error", "ticket_id": "...", "error": "...", "message": "..."}
//! {"type": "system_error", "error": "...", "message": "...", "component": "..."}
//! {"type": "pong", "timestamp": "..."}
//! ```
//!
//! Both directions are closed tagged unions: unknown kinds fail to parse and
//! are logged and dropped by the receiving side, never best-effort merged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, LogEntry, Severity, Ticket, TicketId, TicketStatus};

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Request ticket creation. No direct response event; the subsequent
    /// `workflow_update` confirms creation.
    CreateTicket { subject: String, timestamp: String },
    /// Liveness probe; the server answers with `pong`.
    Ping { timestamp: String },
}

/// Events the server broadcasts to connected observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full or partial ticket snapshot. Absent optional fields leave the
    /// observer's existing local values untouched.
    WorkflowUpdate {
        ticket_id: TicketId,
        status: TicketStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<Category>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        created_at: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retry_count: Option<u32>,
    },
    /// One audit-trail entry for a ticket.
    LogUpdate {
        ticket_id: TicketId,
        source: String,
        message: String,
        timestamp: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        associated_status: Option<TicketStatus>,
        severity: Severity,
    },
    /// Ticket-scoped failure; forces the observer's local status to a
    /// failure representation.
    WorkflowError {
        ticket_id: TicketId,
        error: String,
        message: String,
    },
    /// Failure not tied to any ticket, surfaced as a notification.
    SystemError {
        error: String,
        message: String,
        component: String,
    },
    /// Reciprocal acknowledgment of a client `ping`.
    Pong { timestamp: String },
}

impl ServerEvent {
    /// Builds a full-snapshot `workflow_update` from a ticket record.
    pub fn workflow_update(ticket: &Ticket) -> Self {
        ServerEvent::WorkflowUpdate {
            ticket_id: ticket.id.clone(),
            status: ticket.status,
            category: ticket.category,
            created_at: Some(ticket.created_at),
            message: Some(ticket.status.describe().to_string()),
            retry_count: Some(ticket.retry_count),
        }
    }

    /// Builds a `log_update` from an appended log entry.
    pub fn log_update(ticket_id: &TicketId, entry: &LogEntry) -> Self {
        ServerEvent::LogUpdate {
            ticket_id: ticket_id.clone(),
            source: entry.source.clone(),
            message: entry.message.clone(),
            timestamp: entry.timestamp,
            associated_status: entry.associated_status,
            severity: entry.severity,
        }
    }

    /// The ticket this event is scoped to, if any.
    pub fn ticket_id(&self) -> Option<&TicketId> {
        match self {
            ServerEvent::WorkflowUpdate { ticket_id, .. }
            | ServerEvent::LogUpdate { ticket_id, .. }
            | ServerEvent::WorkflowError { ticket_id, .. } => Some(ticket_id),
            ServerEvent::SystemError { .. } | ServerEvent::Pong { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_round_trip() {
        let json = r#"{"type": "create_ticket", "subject": "Password reset request", "timestamp": "t1"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::CreateTicket {
                subject: "Password reset request".into(),
                timestamp: "t1".into()
            }
        );
    }

    #[test]
    fn unknown_client_kind_is_rejected() {
        let json = r#"{"type": "reboot_server", "target": "all"}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn workflow_update_omits_absent_fields() {
        let event = ServerEvent::WorkflowUpdate {
            ticket_id: TicketId("SIM-AAAA0001".into()),
            status: TicketStatus::Processing,
            category: None,
            created_at: None,
            message: None,
            retry_count: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("category"));
        assert!(!json.contains("created_at"));
        assert!(json.contains("\"status\":\"processing\""));
    }

    #[test]
    fn full_snapshot_from_ticket() {
        let mut ticket = Ticket::new(TicketId("SIM-AAAA0002".into()), "Suspicious email".into());
        ticket.category = Some(Category::Security);
        let event = ServerEvent::workflow_update(&ticket);
        match event {
            ServerEvent::WorkflowUpdate {
                status,
                category,
                retry_count,
                ..
            } => {
                assert_eq!(status, TicketStatus::Received);
                assert_eq!(category, Some(Category::Security));
                assert_eq!(retry_count, Some(0));
            }
            other => panic!("expected workflow_update, got {other:?}"),
        }
    }

    #[test]
    fn log_update_carries_entry_fields() {
        let mut ticket = Ticket::new(TicketId("SIM-AAAA0003".into()), "Mouse broken".into());
        let entry = ticket.append_log(
            "orchestrator",
            Severity::Success,
            "done",
            Some(TicketStatus::Working),
        );
        let event = ServerEvent::log_update(&ticket.id, &entry);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"log_update\""));
        assert!(json.contains("\"severity\":\"success\""));
        assert!(json.contains("\"associated_status\":\"working\""));
    }

    #[test]
    fn ticket_id_scoping() {
        let pong = ServerEvent::Pong {
            timestamp: "t".into(),
        };
        assert!(pong.ticket_id().is_none());

        let err = ServerEvent::WorkflowError {
            ticket_id: TicketId("SIM-AAAA0004".into()),
            error: "executor".into(),
            message: "boom".into(),
        };
        assert_eq!(err.ticket_id().map(|t| t.0.as_str()), Some("SIM-AAAA0004"));
    }
}
