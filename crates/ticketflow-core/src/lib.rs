// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ticketflow workflow engine.
//!
//! This crate provides the foundational types shared across the Ticketflow
//! workspace: the ticket data model and its status state machine, the event
//! protocol spoken between gateway and observers, the shared error type, and
//! the trait seams for the external classifier and specialist executors.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TicketflowError;
pub use events::{ClientEvent, ServerEvent};
pub use types::{
    Category, LogEntry, Severity, Ticket, TicketFailure, TicketId, TicketStatus,
};

// Re-export the collaborator traits at crate root.
pub use traits::{Classifier, ExecutionReport, ProgressSink, SpecialistExecutor};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_STATUSES: [TicketStatus; 8] = [
        TicketStatus::Received,
        TicketStatus::Processing,
        TicketStatus::Classified,
        TicketStatus::Delegating,
        TicketStatus::Working,
        TicketStatus::Resolved,
        TicketStatus::Failed,
        TicketStatus::Escalated,
    ];

    #[test]
    fn ticketflow_error_has_all_variants() {
        // Verify all 9 error variants exist and can be constructed.
        let _validation = TicketflowError::Validation("test".into());
        let _not_found = TicketflowError::NotFound {
            ticket_id: "SIM-00000000".into(),
        };
        let _transition = TicketflowError::InvalidTransition {
            from: TicketStatus::Resolved,
            to: TicketStatus::Processing,
        };
        let _classifier = TicketflowError::Classifier {
            message: "test".into(),
            source: None,
        };
        let _executor = TicketflowError::Executor {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _transport = TicketflowError::Transport {
            message: "test".into(),
            source: None,
        };
        let _config = TicketflowError::Config("test".into());
        let _timeout = TicketflowError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = TicketflowError::Internal("test".into());
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(TicketflowError::Validation("x".into()).code(), "validation");
        assert_eq!(
            TicketflowError::InvalidTransition {
                from: TicketStatus::Resolved,
                to: TicketStatus::Working,
            }
            .code(),
            "invalid_transition"
        );
        assert_eq!(TicketflowError::Internal("x".into()).code(), "internal");
    }

    fn status_strategy() -> impl Strategy<Value = TicketStatus> {
        prop::sample::select(ALL_STATUSES.to_vec())
    }

    proptest! {
        // Property: a ticket driven by arbitrary transition requests never
        // ends up having taken an edge absent from the table.
        #[test]
        fn no_illegal_transition_is_ever_applied(
            requests in prop::collection::vec(status_strategy(), 1..64)
        ) {
            let mut ticket = Ticket::new(
                TicketId("SIM-PROPTEST".into()),
                "fuzzed subject".into(),
            );
            for target in requests {
                let before = ticket.status;
                match ticket.transition_to(target) {
                    Ok(()) => {
                        prop_assert!(before.can_transition_to(target));
                        prop_assert_eq!(ticket.status, target);
                    }
                    Err(_) => {
                        prop_assert!(!before.can_transition_to(target));
                        prop_assert_eq!(ticket.status, before);
                    }
                }
            }
        }

        // Property: the table is internally consistent, and resolved has
        // no outgoing edges.
        #[test]
        fn allowed_targets_are_consistent(status in status_strategy()) {
            for target in status.allowed_targets() {
                prop_assert!(status.can_transition_to(*target));
            }
            if status.is_terminal() {
                prop_assert!(status.allowed_targets().is_empty());
            }
        }
    }
}
