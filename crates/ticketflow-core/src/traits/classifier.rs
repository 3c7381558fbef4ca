// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifier gateway trait: assigns a category to a ticket subject.

use async_trait::async_trait;

use crate::error::TicketflowError;
use crate::types::Category;

/// External collaborator that classifies a ticket subject.
///
/// Treated as a black box: latency and failure modes (timeouts, malformed
/// responses, quota errors) are the orchestrator's burden. Classification
/// failure is always recoverable via [`Category::FALLBACK`] and must never
/// block routing.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies a ticket subject into a category.
    async fn classify(&self, subject: &str) -> Result<Category, TicketflowError>;
}
