// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Ticketflow integration tests.
//!
//! Provides mock triage components and test harness infrastructure for
//! fast, deterministic, CI-runnable tests without real heuristics or
//! sockets.
//!
//! # Components
//!
//! - [`MockClassifier`] - classifier with a pre-configured outcome queue
//! - [`MockExecutor`] - specialist executor with scripted steps and failure injection
//! - [`TestHarness`] - assembled store + broadcaster + orchestrator stack

pub mod harness;
pub mod mock_classifier;
pub mod mock_executor;

pub use harness::TestHarness;
pub use mock_classifier::MockClassifier;
pub use mock_executor::MockExecutor;
