// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow orchestrator: drives tickets through the status state machine.
//!
//! For each ticket the orchestrator runs the two-stage pipeline: the
//! classifier gateway assigns a category (with a safe fallback on failure),
//! then a specialist executor performs the remediation steps. Every
//! transition and every log line is persisted into the [`WorkflowStore`] and
//! fanned out through the [`EventBroadcaster`].
//!
//! Tickets are processed independently and concurrently on spawned tasks,
//! but a single ticket is advanced by exactly one in-flight run at a time:
//! an in-flight guard refuses a second concurrent run for the same id.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use ticketflow_core::{
    Category, Classifier, ProgressSink, Severity, SpecialistExecutor, Ticket, TicketFailure,
    TicketId, TicketStatus, TicketflowError,
};

use crate::broadcast::EventBroadcaster;
use crate::store::{TransitionResult, WorkflowStore};

/// Aggregate workflow counters, reported through [`Orchestrator::metrics`].
#[derive(Debug, Default, Clone)]
struct WorkflowCounters {
    total_processed: u64,
    resolved: u64,
    failed_attempts: u64,
    escalated: u64,
}

/// Point-in-time metrics snapshot.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    /// Processing runs started (including retries).
    pub total_processed: u64,
    /// Tickets that reached `resolved`.
    pub resolved: u64,
    /// Executor failures observed (each failed attempt counts).
    pub failed_attempts: u64,
    /// Tickets that landed in permanent `escalated`.
    pub escalated: u64,
    /// `resolved / (resolved + escalated)` as a percentage; 100 when no
    /// ticket has completed yet.
    pub success_rate_percent: f64,
    /// Coarse health grade derived from the failure rate.
    pub health: &'static str,
}

/// Drives tickets through creation, classification, delegation, execution,
/// and terminal states.
pub struct Orchestrator {
    store: Arc<WorkflowStore>,
    broadcaster: EventBroadcaster,
    classifier: Arc<dyn Classifier>,
    executors: Vec<Arc<dyn SpecialistExecutor>>,
    max_retries: u32,
    in_flight: DashMap<TicketId, ()>,
    counters: Mutex<WorkflowCounters>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<WorkflowStore>,
        broadcaster: EventBroadcaster,
        classifier: Arc<dyn Classifier>,
        executors: Vec<Arc<dyn SpecialistExecutor>>,
        max_retries: u32,
    ) -> Self {
        Self {
            store,
            broadcaster,
            classifier,
            executors,
            max_retries,
            in_flight: DashMap::new(),
            counters: Mutex::new(WorkflowCounters::default()),
        }
    }

    pub fn store(&self) -> &Arc<WorkflowStore> {
        &self.store
    }

    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.broadcaster
    }

    /// Creates a ticket and spawns its processing run (fire-and-forget).
    ///
    /// Validation errors are returned synchronously; nothing is created and
    /// no event is emitted for an invalid subject.
    pub fn submit(self: &Arc<Self>, raw_subject: &str) -> Result<TicketId, TicketflowError> {
        let ticket = self.store.create(raw_subject)?;
        let id = ticket.id.clone();

        let (ticket, entry) = self.store.append_entry(
            &id,
            "system",
            Severity::Info,
            format!("Ticket created: {}", ticket.subject),
            Some(TicketStatus::Received),
        )?;
        self.broadcaster.workflow_update(&ticket);
        self.broadcaster.log_update(&id, &entry);

        info!(ticket_id = %id, "ticket submitted");

        let this = Arc::clone(self);
        let task_id = id.clone();
        tokio::spawn(async move {
            this.process(task_id, false).await;
        });

        Ok(id)
    }

    /// Initiates a manual retry for a `failed` or `escalated` ticket.
    ///
    /// Rejected when the ticket is in any other state, when its retry budget
    /// is exhausted (permanent escalation), or when a run is already in
    /// flight.
    pub fn retry(self: &Arc<Self>, id: &TicketId) -> Result<(), TicketflowError> {
        let ticket = self.store.get(id)?;
        match ticket.status {
            TicketStatus::Failed | TicketStatus::Escalated => {}
            other => {
                return Err(TicketflowError::Validation(format!(
                    "ticket {id} is {other}, not retryable"
                )));
            }
        }
        if ticket.retry_count >= self.max_retries {
            return Err(TicketflowError::Validation(format!(
                "ticket {id} exhausted its retry budget and is permanently escalated"
            )));
        }
        if self.in_flight.contains_key(id) {
            return Err(TicketflowError::Validation(format!(
                "ticket {id} is already being processed"
            )));
        }

        let this = Arc::clone(self);
        let task_id = id.clone();
        tokio::spawn(async move {
            this.process(task_id, true).await;
        });
        Ok(())
    }

    /// Current aggregate metrics.
    pub fn metrics(&self) -> MetricsSnapshot {
        let counters = self.counters.lock().expect("counters mutex poisoned");
        let completed = counters.resolved + counters.escalated;
        let success_rate = if completed == 0 {
            100.0
        } else {
            counters.resolved as f64 / completed as f64 * 100.0
        };
        let failure_rate = if counters.total_processed == 0 {
            0.0
        } else {
            counters.failed_attempts as f64 / counters.total_processed as f64 * 100.0
        };
        MetricsSnapshot {
            total_processed: counters.total_processed,
            resolved: counters.resolved,
            failed_attempts: counters.failed_attempts,
            escalated: counters.escalated,
            success_rate_percent: success_rate,
            health: if failure_rate > 10.0 { "degraded" } else { "healthy" },
        }
    }

    /// Runs one ticket through the pipeline until a terminal outcome.
    async fn process(self: Arc<Self>, id: TicketId, manual_retry: bool) {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight, &id) else {
            warn!(ticket_id = %id, "concurrent run refused, ticket already in flight");
            return;
        };

        if let Err(err) = self.run_pipeline(&id, manual_retry).await {
            // NotFound / rejected transitions end the run; the audit trail
            // already carries the reason.
            error!(ticket_id = %id, error = %err, "processing run aborted");
            self.broadcaster.system_error("orchestrator", &err);
        }
    }

    async fn run_pipeline(
        &self,
        id: &TicketId,
        manual_retry: bool,
    ) -> Result<(), TicketflowError> {
        if manual_retry {
            self.note_retry(id, "Manual retry initiated")?;
        }

        loop {
            self.counters
                .lock()
                .expect("counters mutex poisoned")
                .total_processed += 1;

            self.advance(id, TicketStatus::Processing)?;

            let category = self.classify(id).await?;
            self.advance(id, TicketStatus::Classified)?;

            self.advance(id, TicketStatus::Delegating)?;
            let executor = self.select_executor(category);
            self.log_and_broadcast(
                id,
                "orchestrator",
                Severity::Info,
                format!("Routing to {}", executor.name()),
                Some(TicketStatus::Delegating),
            )?;

            self.advance(id, TicketStatus::Working)?;
            let snapshot = self.store.get(id)?;
            let sink = BroadcastProgress {
                store: Arc::clone(&self.store),
                broadcaster: self.broadcaster.clone(),
                ticket_id: id.clone(),
                source: executor.name().to_string(),
            };

            match executor.run(&snapshot, &sink).await {
                Ok(report) => {
                    self.advance(id, TicketStatus::Resolved)?;
                    self.log_and_broadcast(
                        id,
                        executor.name(),
                        Severity::Success,
                        format!(
                            "{} ({} items handled)",
                            report.summary, report.items_handled
                        ),
                        Some(TicketStatus::Resolved),
                    )?;
                    self.counters
                        .lock()
                        .expect("counters mutex poisoned")
                        .resolved += 1;
                    info!(ticket_id = %id, "ticket resolved");
                    return Ok(());
                }
                Err(err) => {
                    self.counters
                        .lock()
                        .expect("counters mutex poisoned")
                        .failed_attempts += 1;

                    let retries_used = self.store.get(id)?.retry_count;
                    if retries_used < self.max_retries {
                        self.record_failure(id, &err, TicketStatus::Failed, executor.name())?;
                        self.note_retry(id, "Automatic retry")?;
                        continue;
                    }

                    // Retry budget exhausted: convert the final failure into
                    // a permanent escalation (working -> escalated).
                    self.record_failure(id, &err, TicketStatus::Escalated, executor.name())?;
                    self.log_and_broadcast(
                        id,
                        "orchestrator",
                        Severity::Warning,
                        "Retry budget exhausted, escalating for manual review",
                        Some(TicketStatus::Escalated),
                    )?;
                    self.counters
                        .lock()
                        .expect("counters mutex poisoned")
                        .escalated += 1;
                    warn!(ticket_id = %id, "ticket escalated");
                    return Ok(());
                }
            }
        }
    }

    /// Classification phase. Classifier failure is absorbed: the fallback
    /// category is used and a warning recorded, so routing is never blocked.
    async fn classify(&self, id: &TicketId) -> Result<Category, TicketflowError> {
        let subject = self.store.get(id)?.subject;

        let category = match self.classifier.classify(&subject).await {
            Ok(category) => {
                self.log_and_broadcast(
                    id,
                    "classifier",
                    Severity::Info,
                    format!("Classified as '{}'", category.label()),
                    Some(TicketStatus::Processing),
                )?;
                category
            }
            Err(err) => {
                warn!(ticket_id = %id, error = %err, "classification failed, using fallback");
                self.log_and_broadcast(
                    id,
                    "classifier",
                    Severity::Warning,
                    format!(
                        "Classification failed ({err}); falling back to '{}'",
                        Category::FALLBACK.label()
                    ),
                    Some(TicketStatus::Processing),
                )?;
                Category::FALLBACK
            }
        };

        let updated = self.store.update(id, |ticket| {
            ticket.category = Some(category);
            Ok(())
        })?;
        self.broadcaster.workflow_update(&updated);
        Ok(category)
    }

    /// Picks the specialist for the category, falling back to the general
    /// executor when no specialist matches.
    fn select_executor(&self, category: Category) -> Arc<dyn SpecialistExecutor> {
        self.executors
            .iter()
            .find(|e| e.category() == category)
            .or_else(|| {
                self.executors
                    .iter()
                    .find(|e| e.category() == Category::General)
            })
            .cloned()
            .unwrap_or_else(|| Arc::new(NoopExecutor))
    }

    /// Applies a transition, records the default status description, and
    /// broadcasts both the snapshot and the log line.
    fn advance(&self, id: &TicketId, to: TicketStatus) -> Result<Ticket, TicketflowError> {
        match self.store.transition(id, to)? {
            TransitionResult::Applied(ticket) => {
                let (ticket, entry) = self.store.append_entry(
                    id,
                    "orchestrator",
                    Severity::Info,
                    to.describe(),
                    Some(to),
                )?;
                self.broadcaster.workflow_update(&ticket);
                self.broadcaster.log_update(id, &entry);
                debug!(ticket_id = %id, status = %to, "status advanced");
                Ok(ticket)
            }
            TransitionResult::Rejected { ticket, warning } => {
                self.broadcaster.log_update(id, &warning);
                Err(TicketflowError::InvalidTransition {
                    from: ticket.status,
                    to,
                })
            }
        }
    }

    /// Records an executor failure: structured error on the ticket, the
    /// failure transition, an error log line, and a `workflow_error` event.
    fn record_failure(
        &self,
        id: &TicketId,
        err: &TicketflowError,
        to: TicketStatus,
        executor_name: &str,
    ) -> Result<(), TicketflowError> {
        let updated = self.store.update(id, |ticket| {
            ticket.error = Some(TicketFailure {
                code: err.code().to_string(),
                message: err.to_string(),
            });
            Ok(())
        })?;
        debug!(ticket_id = %id, retry_count = updated.retry_count, "failure recorded");

        self.advance(id, to)?;
        self.log_and_broadcast(
            id,
            executor_name,
            Severity::Error,
            format!("Execution failed: {err}"),
            Some(to),
        )?;
        self.broadcaster.workflow_error(id, err);
        Ok(())
    }

    /// Increments the retry counter and records the retry in the audit trail.
    fn note_retry(&self, id: &TicketId, reason: &str) -> Result<(), TicketflowError> {
        let updated = self.store.update(id, |ticket| {
            ticket.retry_count += 1;
            Ok(())
        })?;
        self.log_and_broadcast(
            id,
            "orchestrator",
            Severity::Info,
            format!(
                "{reason} (attempt {} of {})",
                updated.retry_count, self.max_retries
            ),
            None,
        )?;
        Ok(())
    }

    fn log_and_broadcast(
        &self,
        id: &TicketId,
        source: &str,
        severity: Severity,
        message: impl Into<String>,
        associated_status: Option<TicketStatus>,
    ) -> Result<(), TicketflowError> {
        let (_, entry) = self
            .store
            .append_entry(id, source, severity, message, associated_status)?;
        self.broadcaster.log_update(id, &entry);
        Ok(())
    }
}

/// Progress sink that persists each executor step as a working-status log
/// entry and broadcasts it.
struct BroadcastProgress {
    store: Arc<WorkflowStore>,
    broadcaster: EventBroadcaster,
    ticket_id: TicketId,
    source: String,
}

#[async_trait::async_trait]
impl ProgressSink for BroadcastProgress {
    async fn step(&self, name: &str, message: &str) {
        match self.store.append_entry(
            &self.ticket_id,
            &self.source,
            Severity::Info,
            format!("{name}: {message}"),
            Some(TicketStatus::Working),
        ) {
            Ok((_, entry)) => self.broadcaster.log_update(&self.ticket_id, &entry),
            Err(err) => warn!(ticket_id = %self.ticket_id, error = %err, "step report dropped"),
        }
    }
}

/// Last-resort executor when no specialist (not even a general one) is
/// registered. Succeeds without doing anything so a misconfigured registry
/// does not strand tickets.
struct NoopExecutor;

#[async_trait::async_trait]
impl SpecialistExecutor for NoopExecutor {
    fn name(&self) -> &str {
        "noop"
    }

    fn category(&self) -> Category {
        Category::General
    }

    async fn run(
        &self,
        _ticket: &Ticket,
        _progress: &dyn ProgressSink,
    ) -> Result<ticketflow_core::ExecutionReport, TicketflowError> {
        Ok(ticketflow_core::ExecutionReport {
            summary: "No specialist registered; ticket closed without action".to_string(),
            items_handled: 0,
        })
    }
}

/// Removes the in-flight marker when an orchestration run ends, however it
/// ends.
struct InFlightGuard<'a> {
    map: &'a DashMap<TicketId, ()>,
    id: TicketId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(map: &'a DashMap<TicketId, ()>, id: &TicketId) -> Option<Self> {
        if map.insert(id.clone(), ()).is_some() {
            return None;
        }
        Some(Self {
            map,
            id: id.clone(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}
