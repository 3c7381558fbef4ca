// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ticketflow workflow engine.

use thiserror::Error;

use crate::types::TicketStatus;

/// The primary error type used across all Ticketflow crates.
#[derive(Debug, Error)]
pub enum TicketflowError {
    /// Subject validation errors (empty, too long, disallowed characters).
    /// Rejected before a ticket is created and never enter the state machine.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested ticket does not exist in the workflow store.
    #[error("ticket not found: {ticket_id}")]
    NotFound { ticket_id: String },

    /// A status change was attempted along an edge absent from the
    /// transition table. The ticket's status is left unchanged.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },

    /// Classifier gateway errors (timeout, malformed response, quota).
    /// Always recoverable via the fallback category.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Specialist executor errors. Drive failed/escalated with bounded retry.
    #[error("executor error: {message}")]
    Executor {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Transport errors (socket bind/accept, client connection loss).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TicketflowError {
    /// Short machine-readable code used in `workflow_error` / `system_error`
    /// protocol events.
    pub fn code(&self) -> &'static str {
        match self {
            TicketflowError::Validation(_) => "validation",
            TicketflowError::NotFound { .. } => "not_found",
            TicketflowError::InvalidTransition { .. } => "invalid_transition",
            TicketflowError::Classifier { .. } => "classifier",
            TicketflowError::Executor { .. } => "executor",
            TicketflowError::Transport { .. } => "transport",
            TicketflowError::Config(_) => "config",
            TicketflowError::Timeout { .. } => "timeout",
            TicketflowError::Internal(_) => "internal",
        }
    }
}
