// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory workflow store: the single source of truth for ticket records
//! on the server side.
//!
//! Tickets live in a [`DashMap`] keyed by id, so mutations to one ticket are
//! atomic with respect to concurrent orchestrator steps on another. The
//! single-writer-per-ticket discipline (no two concurrent advances on the
//! same ticket) is enforced one level up by the orchestrator's in-flight
//! guard; the store only guarantees each individual mutation is atomic.
//!
//! Tickets are never deleted: terminal tickets remain for the life of the
//! process.

use dashmap::DashMap;
use ticketflow_core::types::validate_subject;
use ticketflow_core::{
    LogEntry, Severity, Ticket, TicketId, TicketStatus, TicketflowError,
};

/// Outcome of a requested status transition.
#[derive(Debug, Clone)]
pub enum TransitionResult {
    /// The edge exists; the new ticket snapshot is returned.
    Applied(Ticket),
    /// The edge is absent from the table. The status is unchanged and the
    /// rejection has been recorded as a warning entry in the audit trail.
    Rejected { ticket: Ticket, warning: LogEntry },
}

/// In-memory registry of ticket records keyed by identifier.
pub struct WorkflowStore {
    tickets: DashMap<TicketId, Ticket>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self {
            tickets: DashMap::new(),
        }
    }

    /// Creates a ticket in the `received` state from a raw subject.
    ///
    /// Validation errors are reported synchronously and never enter the
    /// state machine.
    pub fn create(&self, raw_subject: &str) -> Result<Ticket, TicketflowError> {
        let subject = validate_subject(raw_subject)?;
        let id = self.allocate_id();
        let ticket = Ticket::new(id.clone(), subject);
        self.tickets.insert(id, ticket.clone());
        tracing::debug!(ticket_id = %ticket.id, "ticket created");
        Ok(ticket)
    }

    /// Returns a snapshot of the ticket, or `NotFound`.
    pub fn get(&self, id: &TicketId) -> Result<Ticket, TicketflowError> {
        self.tickets
            .get(id)
            .map(|entry| entry.clone())
            .ok_or_else(|| TicketflowError::NotFound {
                ticket_id: id.0.clone(),
            })
    }

    /// Applies a mutation to the ticket under the map's entry lock and
    /// returns the updated snapshot.
    pub fn update<F>(&self, id: &TicketId, mutate: F) -> Result<Ticket, TicketflowError>
    where
        F: FnOnce(&mut Ticket) -> Result<(), TicketflowError>,
    {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| TicketflowError::NotFound {
                ticket_id: id.0.clone(),
            })?;
        mutate(entry.value_mut())?;
        Ok(entry.clone())
    }

    /// Attempts a status transition, recording a warning entry on rejection.
    ///
    /// Illegal edges never mutate the status; the rejection itself becomes
    /// part of the audit trail so no failure goes unrecorded.
    pub fn transition(
        &self,
        id: &TicketId,
        to: TicketStatus,
    ) -> Result<TransitionResult, TicketflowError> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| TicketflowError::NotFound {
                ticket_id: id.0.clone(),
            })?;
        let ticket = entry.value_mut();
        match ticket.transition_to(to) {
            Ok(()) => Ok(TransitionResult::Applied(ticket.clone())),
            Err(err) => {
                tracing::warn!(ticket_id = %id, error = %err, "transition rejected");
                let warning = ticket.append_log(
                    "system",
                    Severity::Warning,
                    format!("Rejected status change: {err}"),
                    None,
                );
                Ok(TransitionResult::Rejected {
                    ticket: ticket.clone(),
                    warning,
                })
            }
        }
    }

    /// Appends a log entry and returns it together with the new snapshot.
    pub fn append_entry(
        &self,
        id: &TicketId,
        source: &str,
        severity: Severity,
        message: impl Into<String>,
        associated_status: Option<TicketStatus>,
    ) -> Result<(Ticket, LogEntry), TicketflowError> {
        let mut entry = self
            .tickets
            .get_mut(id)
            .ok_or_else(|| TicketflowError::NotFound {
                ticket_id: id.0.clone(),
            })?;
        let ticket = entry.value_mut();
        let log_entry = ticket.append_log(source, severity, message, associated_status);
        Ok((ticket.clone(), log_entry))
    }

    /// Snapshot of all tickets, unordered.
    pub fn list(&self) -> Vec<Ticket> {
        self.tickets.iter().map(|entry| entry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Allocates a `SIM-XXXXXXXX` id, unique for the process lifetime.
    fn allocate_id(&self) -> TicketId {
        loop {
            let short = uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase();
            let id = TicketId(format!("SIM-{short}"));
            if !self.tickets.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_in_received() {
        let store = WorkflowStore::new();
        let ticket = store.create("Suspicious email from CEO").unwrap();
        assert_eq!(ticket.status, TicketStatus::Received);
        assert!(ticket.id.0.starts_with("SIM-"));
        assert_eq!(ticket.id.0.len(), 12);
        assert_eq!(ticket.retry_count, 0);
    }

    #[test]
    fn create_rejects_invalid_subjects() {
        let store = WorkflowStore::new();
        assert!(matches!(
            store.create("  x "),
            Err(TicketflowError::Validation(_))
        ));
        assert!(store.create("<b>bold</b>").is_err());
        assert_eq!(store.len(), 0, "rejected subjects must not create tickets");
    }

    #[test]
    fn get_unknown_is_not_found() {
        let store = WorkflowStore::new();
        let err = store.get(&TicketId("SIM-MISSING0".into())).unwrap_err();
        assert!(matches!(err, TicketflowError::NotFound { .. }));
    }

    #[test]
    fn ids_are_unique() {
        let store = WorkflowStore::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let ticket = store.create("Printer offline in building 4").unwrap();
            assert!(seen.insert(ticket.id.0.clone()), "duplicate id allocated");
        }
    }

    #[test]
    fn legal_transition_applies() {
        let store = WorkflowStore::new();
        let ticket = store.create("VPN down for remote staff").unwrap();
        match store.transition(&ticket.id, TicketStatus::Processing).unwrap() {
            TransitionResult::Applied(updated) => {
                assert_eq!(updated.status, TicketStatus::Processing);
            }
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[test]
    fn illegal_transition_is_rejected_and_logged() {
        let store = WorkflowStore::new();
        let ticket = store.create("Laptop battery swollen").unwrap();
        match store.transition(&ticket.id, TicketStatus::Resolved).unwrap() {
            TransitionResult::Rejected { ticket, warning } => {
                assert_eq!(ticket.status, TicketStatus::Received);
                assert_eq!(warning.severity, Severity::Warning);
                assert_eq!(ticket.log.len(), 1);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn update_mutates_atomically() {
        let store = WorkflowStore::new();
        let ticket = store.create("Monitor flickering").unwrap();
        let updated = store
            .update(&ticket.id, |t| {
                t.retry_count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(updated.retry_count, 1);
        assert_eq!(store.get(&ticket.id).unwrap().retry_count, 1);
    }

    #[test]
    fn list_returns_all() {
        let store = WorkflowStore::new();
        store.create("Subject one here").unwrap();
        store.create("Subject two here").unwrap();
        assert_eq!(store.list().len(), 2);
    }
}
