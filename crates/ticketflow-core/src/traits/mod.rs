// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams for the two external collaborators the orchestrator consumes.

pub mod classifier;
pub mod executor;

pub use classifier::Classifier;
pub use executor::{ExecutionReport, ProgressSink, SpecialistExecutor};
