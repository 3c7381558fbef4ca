// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-side workflow engine: ticket store, status state machine
//! enforcement, the orchestrator pipeline, and the event broadcaster.
//!
//! The [`Orchestrator`] is the only component that advances tickets. It
//! owns the pipeline (classification, delegation, execution, retries and
//! escalation) and publishes every observable change through the
//! [`EventBroadcaster`]; the [`WorkflowStore`] remains the source of truth
//! for snapshots.

pub mod broadcast;
pub mod orchestrator;
pub mod store;

pub use broadcast::EventBroadcaster;
pub use orchestrator::{MetricsSnapshot, Orchestrator};
pub use store::{TransitionResult, WorkflowStore};
