// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end workflow testing.
//!
//! `TestHarness` assembles a complete orchestration stack with mock
//! classifier and executors. Provides `submit_and_settle()` to drive a
//! ticket through the full pipeline and wait for its resting state.

use std::sync::Arc;
use std::time::Duration;

use ticketflow_core::{
    Category, Classifier, ServerEvent, SpecialistExecutor, Ticket, TicketId, TicketStatus,
    TicketflowError,
};
use ticketflow_workflow::{EventBroadcaster, Orchestrator, WorkflowStore};

use crate::mock_classifier::MockClassifier;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    classifier_outcomes: Vec<Result<Category, String>>,
    executors: Vec<Arc<dyn SpecialistExecutor>>,
    max_retries: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            classifier_outcomes: Vec::new(),
            executors: Vec::new(),
            max_retries: 2,
        }
    }

    /// Pre-load the mock classifier's outcome queue.
    pub fn with_classifier_outcomes(
        mut self,
        outcomes: Vec<Result<Category, String>>,
    ) -> Self {
        self.classifier_outcomes = outcomes;
        self
    }

    /// Register a specialist executor.
    pub fn with_executor(mut self, executor: Arc<dyn SpecialistExecutor>) -> Self {
        self.executors.push(executor);
        self
    }

    /// Set the automatic retry bound.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Build the harness, wiring store, broadcaster, and orchestrator.
    pub fn build(self) -> TestHarness {
        let store = Arc::new(WorkflowStore::new());
        let broadcaster = EventBroadcaster::new();
        let classifier = Arc::new(MockClassifier::with_outcomes(self.classifier_outcomes));
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&store),
            broadcaster.clone(),
            Arc::clone(&classifier) as Arc<dyn Classifier>,
            self.executors,
            self.max_retries,
        ));
        TestHarness {
            store,
            broadcaster,
            classifier,
            orchestrator,
        }
    }
}

/// A complete orchestration environment with mock triage components.
pub struct TestHarness {
    /// The ticket store backing the orchestrator.
    pub store: Arc<WorkflowStore>,
    /// The broadcaster; subscribe before submitting to observe events.
    pub broadcaster: EventBroadcaster,
    /// The mock classifier; add outcomes to script later tickets.
    pub classifier: Arc<MockClassifier>,
    /// The orchestrator under test.
    pub orchestrator: Arc<Orchestrator>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Submit a ticket and wait for it to reach a resting state
    /// (`resolved` or `escalated`).
    ///
    /// Panics if the ticket has not settled within five seconds; the
    /// pipeline has no unbounded waits, so that means a test bug.
    pub async fn submit_and_settle(&self, subject: &str) -> Result<Ticket, TicketflowError> {
        let id = self.orchestrator.submit(subject)?;
        Ok(self.wait_for_settled(&id).await)
    }

    /// Poll the store until the ticket settles.
    pub async fn wait_for_settled(&self, id: &TicketId) -> Ticket {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let ticket = self.store.get(id).expect("ticket disappeared from store");
            match ticket.status {
                TicketStatus::Resolved | TicketStatus::Escalated => return ticket,
                _ => {}
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("ticket {id} did not settle: stuck in {}", ticket.status);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Drain every event currently buffered on a subscription.
    pub fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }
}
