// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Security specialist: phishing remediation protocol.
//!
//! Runs analyze, contain, eradicate in order, reporting each phase through
//! the progress sink, then documents the outcome in the final report.
//! Remediation is simulated: the counts are derived deterministically from
//! the subject so repeated runs of the same ticket produce the same report.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use ticketflow_core::{
    Category, ExecutionReport, ProgressSink, SpecialistExecutor, Ticket, TicketflowError,
};

/// Phishing/Security remediation executor.
pub struct SecurityExecutor {
    /// Artificial pause between protocol phases, for demo pacing. Zero by
    /// default so tests run instantly.
    step_delay: Duration,
}

impl SecurityExecutor {
    pub fn new() -> Self {
        Self {
            step_delay: Duration::ZERO,
        }
    }

    pub fn with_step_delay(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    async fn pace(&self) {
        if !self.step_delay.is_zero() {
            tokio::time::sleep(self.step_delay).await;
        }
    }
}

impl Default for SecurityExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpecialistExecutor for SecurityExecutor {
    fn name(&self) -> &str {
        "phishguard"
    }

    fn category(&self) -> Category {
        Category::Security
    }

    async fn run(
        &self,
        ticket: &Ticket,
        progress: &dyn ProgressSink,
    ) -> Result<ExecutionReport, TicketflowError> {
        let seed = subject_seed(&ticket.subject);
        let urls_blocked = 1 + (seed % 3) as u32;
        let emails_purged = 2 + ((seed >> 8) % 8) as u32;

        progress
            .step(
                "analyze",
                &format!(
                    "Examining reported message and extracting indicators of compromise for '{}'",
                    ticket.subject
                ),
            )
            .await;
        self.pace().await;

        progress
            .step(
                "contain",
                &format!("Blocked {urls_blocked} malicious URL(s) at the gateway"),
            )
            .await;
        self.pace().await;

        progress
            .step(
                "eradicate",
                &format!("Purged {emails_purged} matching message(s) from user inboxes"),
            )
            .await;

        info!(ticket_id = %ticket.id, urls_blocked, emails_purged, "remediation complete");
        Ok(ExecutionReport {
            summary: format!(
                "Threat neutralized: {urls_blocked} URL(s) blocked, {emails_purged} message(s) purged"
            ),
            items_handled: urls_blocked + emails_purged,
        })
    }
}

/// FNV-1a over the subject bytes. Stable across runs so the simulated
/// counts for a given subject never change.
fn subject_seed(subject: &str) -> u64 {
    subject
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use ticketflow_core::TicketId;

    struct RecordingSink {
        steps: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn step(&self, name: &str, _message: &str) {
            self.steps.lock().unwrap().push(name.to_string());
        }
    }

    fn ticket(subject: &str) -> Ticket {
        Ticket::new(TicketId("SIM-SEC00001".into()), subject.into())
    }

    #[tokio::test]
    async fn runs_all_phases_in_order() {
        let executor = SecurityExecutor::new();
        let sink = RecordingSink {
            steps: Mutex::new(Vec::new()),
        };
        let report = executor
            .run(&ticket("Phishing email claiming to be payroll"), &sink)
            .await
            .unwrap();

        assert_eq!(
            *sink.steps.lock().unwrap(),
            vec!["analyze", "contain", "eradicate"]
        );
        assert!(report.items_handled >= 3);
        assert!(report.summary.contains("blocked"));
    }

    #[tokio::test]
    async fn reports_are_deterministic_per_subject() {
        let executor = SecurityExecutor::new();
        let sink = RecordingSink {
            steps: Mutex::new(Vec::new()),
        };
        let subject = "Spoofed invoice from vendor";
        let first = executor.run(&ticket(subject), &sink).await.unwrap();
        let second = executor.run(&ticket(subject), &sink).await.unwrap();
        assert_eq!(first.items_handled, second.items_handled);
        assert_eq!(first.summary, second.summary);
    }

    #[tokio::test(start_paused = true)]
    async fn step_delay_paces_the_protocol() {
        let executor = SecurityExecutor::with_step_delay(Duration::from_millis(100));
        let sink = RecordingSink {
            steps: Mutex::new(Vec::new()),
        };
        let started = tokio::time::Instant::now();
        executor
            .run(&ticket("Suspicious attachment opened"), &sink)
            .await
            .unwrap();
        // Two inter-phase pauses under the virtual clock.
        assert_eq!(started.elapsed(), Duration::from_millis(200));
    }
}
