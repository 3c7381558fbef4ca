// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in triage components: the keyword classifier and the two stock
//! specialist executors (security remediation and general service desk).

pub mod classifier;
pub mod general;
pub mod security;

pub use classifier::KeywordClassifier;
pub use general::GeneralExecutor;
pub use security::SecurityExecutor;
