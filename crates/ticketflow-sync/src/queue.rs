// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline action queue.
//!
//! User intent is never discarded: actions issued while disconnected are
//! captured here in order and replayed exactly once after reconnection.

use std::collections::VecDeque;

use ticketflow_core::ClientEvent;

/// FIFO queue of client actions captured while offline.
#[derive(Debug, Default)]
pub struct OfflineQueue {
    actions: VecDeque<ClientEvent>,
}

impl OfflineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures an action for later replay.
    pub fn push(&mut self, action: ClientEvent) {
        self.actions.push_back(action);
    }

    /// Removes and returns all queued actions in capture order. The queue
    /// is empty afterwards, so each action is replayed at most once.
    pub fn drain(&mut self) -> Vec<ClientEvent> {
        self.actions.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
