// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock classifier for deterministic testing.
//!
//! `MockClassifier` implements `Classifier` with pre-configured outcomes,
//! enabling fast, CI-runnable tests without heuristics in the way.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ticketflow_core::{Category, Classifier, TicketflowError};

/// A mock classifier that returns pre-configured outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, the
/// general category is returned.
pub struct MockClassifier {
    outcomes: Arc<Mutex<VecDeque<Result<Category, String>>>>,
}

impl MockClassifier {
    /// Create a new mock classifier with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a mock classifier pre-loaded with the given outcomes.
    /// `Err(message)` entries simulate classifier failure.
    pub fn with_outcomes(outcomes: Vec<Result<Category, String>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
        }
    }

    /// Add an outcome to the end of the queue.
    pub async fn add_outcome(&self, outcome: Result<Category, String>) {
        self.outcomes.lock().await.push_back(outcome);
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, _subject: &str) -> Result<Category, TicketflowError> {
        match self.outcomes.lock().await.pop_front() {
            Some(Ok(category)) => Ok(category),
            Some(Err(message)) => Err(TicketflowError::Classifier {
                message,
                source: None,
            }),
            None => Ok(Category::General),
        }
    }
}
