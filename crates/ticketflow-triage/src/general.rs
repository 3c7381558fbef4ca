// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! General inquiry specialist.
//!
//! Non-security tickets need no remediation protocol. The executor records
//! the routing decision and closes the ticket in a single step.

use async_trait::async_trait;

use ticketflow_core::{
    Category, ExecutionReport, ProgressSink, SpecialistExecutor, Ticket, TicketflowError,
};

/// Handles everything the security specialist does not.
pub struct GeneralExecutor;

impl GeneralExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GeneralExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecialistExecutor for GeneralExecutor {
    fn name(&self) -> &str {
        "servicedesk"
    }

    fn category(&self) -> Category {
        Category::General
    }

    async fn run(
        &self,
        ticket: &Ticket,
        progress: &dyn ProgressSink,
    ) -> Result<ExecutionReport, TicketflowError> {
        progress
            .step(
                "review",
                &format!("Reviewed '{}' and queued it for the service desk", ticket.subject),
            )
            .await;
        Ok(ExecutionReport {
            summary: "Logged and routed to the service desk queue".to_string(),
            items_handled: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use ticketflow_core::TicketId;

    struct RecordingSink {
        steps: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn step(&self, name: &str, message: &str) {
            self.steps
                .lock()
                .unwrap()
                .push((name.to_string(), message.to_string()));
        }
    }

    #[tokio::test]
    async fn single_review_step_then_done() {
        let executor = GeneralExecutor::new();
        let sink = RecordingSink {
            steps: Mutex::new(Vec::new()),
        };
        let ticket = Ticket::new(
            TicketId("SIM-GEN00001".into()),
            "Replace broken headset".into(),
        );
        let report = executor.run(&ticket, &sink).await.unwrap();

        let steps = sink.steps.lock().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].0, "review");
        assert!(steps[0].1.contains("Replace broken headset"));
        assert_eq!(report.items_handled, 1);
    }
}
