// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock specialist executor with scripted steps and failure injection.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use ticketflow_core::{
    Category, ExecutionReport, ProgressSink, SpecialistExecutor, Ticket, TicketflowError,
};

/// A specialist executor whose steps and failures are scripted.
///
/// Fails the first `fail_times` invocations with an execution error, then
/// succeeds, reporting the configured steps through the progress sink.
/// `fail_times = u32::MAX` fails every attempt.
pub struct MockExecutor {
    name: String,
    category: Category,
    steps: Vec<(String, String)>,
    fail_times: u32,
    runs: AtomicU32,
}

impl MockExecutor {
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            category,
            steps: vec![("work".to_string(), "did the thing".to_string())],
            fail_times: 0,
            runs: AtomicU32::new(0),
        }
    }

    /// Replace the scripted (step name, message) sequence.
    pub fn with_steps(mut self, steps: Vec<(&str, &str)>) -> Self {
        self.steps = steps
            .into_iter()
            .map(|(name, message)| (name.to_string(), message.to_string()))
            .collect();
        self
    }

    /// Fail the first `n` invocations before succeeding.
    pub fn failing_times(mut self, n: u32) -> Self {
        self.fail_times = n;
        self
    }

    /// Fail every invocation.
    pub fn always_failing(mut self) -> Self {
        self.fail_times = u32::MAX;
        self
    }

    /// Number of times `run` has been invoked.
    pub fn run_count(&self) -> u32 {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpecialistExecutor for MockExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    async fn run(
        &self,
        _ticket: &Ticket,
        progress: &dyn ProgressSink,
    ) -> Result<ExecutionReport, TicketflowError> {
        let attempt = self.runs.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            return Err(TicketflowError::Executor {
                message: format!("scripted failure on attempt {}", attempt + 1),
                source: None,
            });
        }

        for (name, message) in &self.steps {
            progress.step(name, message).await;
        }
        Ok(ExecutionReport {
            summary: format!("{} finished", self.name),
            items_handled: self.steps.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use ticketflow_core::TicketId;

    struct CountingSink {
        count: Mutex<u32>,
    }

    #[async_trait]
    impl ProgressSink for CountingSink {
        async fn step(&self, _name: &str, _message: &str) {
            *self.count.lock().unwrap() += 1;
        }
    }

    fn ticket() -> Ticket {
        Ticket::new(TicketId("SIM-MOCK0001".into()), "Anything at all".into())
    }

    #[tokio::test]
    async fn fails_then_succeeds() {
        let executor = MockExecutor::new("flaky", Category::General).failing_times(2);
        let sink = CountingSink {
            count: Mutex::new(0),
        };

        assert!(executor.run(&ticket(), &sink).await.is_err());
        assert!(executor.run(&ticket(), &sink).await.is_err());
        let report = executor.run(&ticket(), &sink).await.unwrap();
        assert_eq!(report.items_handled, 1);
        assert_eq!(executor.run_count(), 3);
    }

    #[tokio::test]
    async fn reports_scripted_steps() {
        let executor = MockExecutor::new("scripted", Category::Security)
            .with_steps(vec![("a", "one"), ("b", "two"), ("c", "three")]);
        let sink = CountingSink {
            count: Mutex::new(0),
        };
        let report = executor.run(&ticket(), &sink).await.unwrap();
        assert_eq!(*sink.count.lock().unwrap(), 3);
        assert_eq!(report.items_handled, 3);
    }
}
