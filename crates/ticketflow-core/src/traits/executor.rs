// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Specialist executor trait: performs category-specific remediation steps.

use async_trait::async_trait;

use crate::error::TicketflowError;
use crate::types::{Category, Ticket};

/// Terminal outcome of a completed executor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Human-readable summary for the final log entry.
    pub summary: String,
    /// Count of items acted upon (URLs blocked, emails removed, ...).
    pub items_handled: u32,
}

/// Receives step-completion reports while an executor run is in flight.
///
/// The orchestrator's sink appends a working-status log entry for each step
/// and broadcasts it to observers.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Reports completion of one named step.
    async fn step(&self, name: &str, message: &str);
}

/// External collaborator performing a bounded sequence of remediation steps.
///
/// Executors are black boxes: the orchestrator tolerates their latency and
/// failures, retrying a bounded number of times before escalating.
#[async_trait]
pub trait SpecialistExecutor: Send + Sync {
    /// Name of this executor, used as the log entry source.
    fn name(&self) -> &str;

    /// Category this executor specializes in.
    fn category(&self) -> Category;

    /// Runs the remediation steps, reporting each completion through
    /// `progress`, and returns the terminal outcome.
    async fn run(
        &self,
        ticket: &Ticket,
        progress: &dyn ProgressSink,
    ) -> Result<ExecutionReport, TicketflowError>;
}
