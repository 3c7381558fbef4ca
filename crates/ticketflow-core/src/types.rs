// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Ticketflow workspace: ticket records,
//! status state machine, log entries, and categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::TicketflowError;

/// Minimum subject length after trimming.
pub const SUBJECT_MIN_LEN: usize = 3;
/// Maximum subject length after trimming.
pub const SUBJECT_MAX_LEN: usize = 200;

/// Unique identifier for a ticket, in the `SIM-XXXXXXXX` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub String);

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a ticket.
///
/// The happy path runs `received -> processing -> classified -> delegating
/// -> working -> resolved`. `failed` and `escalated` are reachable from the
/// four in-flight states and recoverable back to `processing` via retry.
/// `resolved` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Received,
    Processing,
    Classified,
    Delegating,
    Working,
    Resolved,
    Failed,
    Escalated,
}

impl TicketStatus {
    /// Allowed transition targets from this status.
    pub fn allowed_targets(self) -> &'static [TicketStatus] {
        use TicketStatus::*;
        match self {
            Received => &[Processing, Failed],
            Processing => &[Classified, Failed, Escalated],
            Classified => &[Delegating, Failed, Escalated],
            Delegating => &[Working, Failed, Escalated],
            Working => &[Resolved, Failed, Escalated],
            Resolved => &[],
            Failed => &[Processing],
            Escalated => &[Processing],
        }
    }

    /// Whether the edge `self -> to` exists in the transition table.
    pub fn can_transition_to(self, to: TicketStatus) -> bool {
        self.allowed_targets().contains(&to)
    }

    /// `resolved` has no outgoing edges.
    pub fn is_terminal(self) -> bool {
        matches!(self, TicketStatus::Resolved)
    }

    /// Human-readable description shown alongside status updates.
    pub fn describe(self) -> &'static str {
        match self {
            TicketStatus::Received => "Ticket created and queued for processing",
            TicketStatus::Processing => "Analyzing ticket",
            TicketStatus::Classified => "Ticket categorized",
            TicketStatus::Delegating => "Routing to specialist",
            TicketStatus::Working => "Specialist executing remediation",
            TicketStatus::Resolved => "Workflow completed successfully",
            TicketStatus::Failed => "Workflow failed with errors",
            TicketStatus::Escalated => "Manual intervention required",
        }
    }
}

/// Triage category assigned by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    General,
}

impl Category {
    /// Fallback used when classification fails; routing must never block.
    pub const FALLBACK: Category = Category::General;

    /// Display label used in log messages.
    pub fn label(self) -> &'static str {
        match self {
            Category::Security => "Phishing/Security",
            Category::General => "General Inquiry",
        }
    }
}

/// Severity of a log entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

/// One timestamped observation appended to a ticket's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic per-ticket counter, unique within the ticket.
    pub id: u64,
    /// Name of the emitting actor (orchestrator, classifier, executor name,
    /// or "system").
    pub source: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    /// Status the entry corresponds to, used for status inference on the
    /// client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_status: Option<TicketStatus>,
}

/// Structured failure reason recorded when a ticket enters a failure state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFailure {
    pub code: String,
    pub message: String,
}

/// The unit of work tracked through the status state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub subject: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TicketFailure>,
    #[serde(default)]
    pub retry_count: u32,
}

impl Ticket {
    /// Creates a new ticket in the `received` state.
    pub fn new(id: TicketId, subject: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            subject,
            status: TicketStatus::Received,
            created_at: now,
            last_updated: now,
            category: None,
            log: Vec::new(),
            error: None,
            retry_count: 0,
        }
    }

    /// Applies a status transition after validating it against the table.
    ///
    /// On an illegal edge the status is left unchanged and
    /// [`TicketflowError::InvalidTransition`] is returned; the caller is
    /// responsible for recording the rejection in the audit trail.
    pub fn transition_to(&mut self, to: TicketStatus) -> Result<(), TicketflowError> {
        if !self.status.can_transition_to(to) {
            return Err(TicketflowError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Appends a log entry, assigning the next monotonic entry id.
    ///
    /// The log is append-only: entries are never removed or reordered, so
    /// `log.len() + 1` is a valid monotonic counter.
    pub fn append_log(
        &mut self,
        source: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        associated_status: Option<TicketStatus>,
    ) -> LogEntry {
        let entry = LogEntry {
            id: self.log.len() as u64 + 1,
            source: source.into(),
            message: message.into(),
            severity,
            timestamp: Utc::now(),
            associated_status,
        };
        self.log.push(entry.clone());
        self.last_updated = Utc::now();
        entry
    }
}

/// Validates a raw subject, returning the trimmed form.
///
/// Rejects subjects shorter than [`SUBJECT_MIN_LEN`] or longer than
/// [`SUBJECT_MAX_LEN`] after trimming, and subjects containing markup
/// delimiters or control characters.
pub fn validate_subject(raw: &str) -> Result<String, TicketflowError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < SUBJECT_MIN_LEN {
        return Err(TicketflowError::Validation(format!(
            "subject must be at least {SUBJECT_MIN_LEN} characters"
        )));
    }
    if len > SUBJECT_MAX_LEN {
        return Err(TicketflowError::Validation(format!(
            "subject must be at most {SUBJECT_MAX_LEN} characters"
        )));
    }
    if trimmed.chars().any(|c| c == '<' || c == '>' || c.is_control()) {
        return Err(TicketflowError::Validation(
            "subject contains disallowed characters".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
