// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic ticket triage.
//!
//! Classifies ticket subjects into Security/General categories using
//! zero-cost keyword rules. No model call, no network, no latency.

use async_trait::async_trait;
use tracing::debug;

use ticketflow_core::{Category, Classifier, TicketflowError};

/// Security indicator patterns (contains, case-insensitive).
const SECURITY_KEYWORDS: &[&str] = &[
    "phishing", "suspicious", "malware", "virus", "hack", "breach",
    "security", "threat", "spam", "scam", "fraud", "unauthorized",
    "malicious", "attack", "compromise", "infected", "trojan",
    "ransomware", "suspicious email", "fake email", "spoofed",
];

/// Keyword-based triage classifier with zero cost and zero latency.
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Classifier for KeywordClassifier {
    async fn classify(&self, subject: &str) -> Result<Category, TicketflowError> {
        let lower = subject.to_lowercase();
        for keyword in SECURITY_KEYWORDS {
            if lower.contains(keyword) {
                debug!(keyword, "security keyword matched");
                return Ok(Category::Security);
            }
        }
        Ok(Category::General)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn security_subjects_route_to_security() {
        let c = KeywordClassifier::new();
        for subject in [
            "Suspicious email from unknown sender",
            "PHISHING attempt reported by accounting",
            "Possible ransomware on shared drive",
            "Unauthorized login attempt on VPN",
        ] {
            assert_eq!(c.classify(subject).await.unwrap(), Category::Security);
        }
    }

    #[tokio::test]
    async fn ordinary_subjects_route_to_general() {
        let c = KeywordClassifier::new();
        for subject in [
            "Printer out of toner on floor 3",
            "Need a new keyboard",
            "Cannot connect to the projector",
        ] {
            assert_eq!(c.classify(subject).await.unwrap(), Category::General);
        }
    }

    #[tokio::test]
    async fn matching_is_case_insensitive() {
        let c = KeywordClassifier::new();
        assert_eq!(
            c.classify("MALWARE detected on workstation").await.unwrap(),
            Category::Security
        );
    }
}
