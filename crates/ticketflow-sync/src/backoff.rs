// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reconnection backoff policy.
//!
//! Exponential with a cap: the delay before attempt `k` (1-based) is
//! `min(base * 2^(k-1), cap)`. A bounded number of attempts is made before
//! the synchronizer drops into explicit offline mode; a manual retry resets
//! the counter.

use std::time::Duration;

/// Policy parameters, fixed for the life of the synchronizer.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    /// Delay before attempt `k` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        debug_assert!(attempt >= 1);
        let shift = (attempt - 1).min(63);
        let delay_ms = (self.base.as_millis() as u64).saturating_mul(1u64 << shift);
        Duration::from_millis(delay_ms.min(self.cap.as_millis() as u64))
    }
}

/// Mutable attempt counter over a [`ReconnectPolicy`].
#[derive(Debug)]
pub struct ReconnectState {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Registers the next attempt and returns the delay to wait before it,
    /// or `None` when the attempt bound is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.policy.delay_for(self.attempts))
    }

    /// Attempts made since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Resets the counter; called on successful connection and on manual
    /// retry.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            base: Duration::from_millis(1000),
            cap: Duration::from_millis(30_000),
            max_attempts: 10,
        }
    }

    #[test]
    fn delay_doubles_until_the_cap() {
        let p = policy();
        assert_eq!(p.delay_for(1), Duration::from_millis(1000));
        assert_eq!(p.delay_for(2), Duration::from_millis(2000));
        assert_eq!(p.delay_for(3), Duration::from_millis(4000));
        assert_eq!(p.delay_for(5), Duration::from_millis(16_000));
        assert_eq!(p.delay_for(6), Duration::from_millis(30_000));
        assert_eq!(p.delay_for(10), Duration::from_millis(30_000));
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let p = policy();
        assert_eq!(p.delay_for(u32::MAX), Duration::from_millis(30_000));
    }

    #[test]
    fn attempts_are_bounded() {
        let mut state = ReconnectState::new(ReconnectPolicy {
            base: Duration::from_millis(100),
            cap: Duration::from_millis(400),
            max_attempts: 3,
        });
        assert_eq!(state.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(state.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(state.next_delay(), Some(Duration::from_millis(400)));
        assert_eq!(state.next_delay(), None, "bound exhausted, offline mode");
        assert_eq!(state.next_delay(), None);
    }

    #[test]
    fn reset_restores_the_budget() {
        let mut state = ReconnectState::new(ReconnectPolicy {
            base: Duration::from_millis(100),
            cap: Duration::from_millis(400),
            max_attempts: 1,
        });
        assert!(state.next_delay().is_some());
        assert!(state.next_delay().is_none());
        state.reset();
        assert_eq!(state.next_delay(), Some(Duration::from_millis(100)));
    }
}
