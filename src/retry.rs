//! Bounded retry budgets
//!
//! Every polling loop in the crate owns one of these. Exhaustion is a
//! first-class outcome reported by the owning poller, never an implicit
//! infinite loop.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    /// Maximum polling cycles before the owner reports exhaustion.
    pub max_attempts: u32,
    /// How long a single cycle may wait on one element.
    pub per_attempt_timeout: Duration,
    /// Sleep between cycles; loops never busy-spin.
    pub poll_interval: Duration,
}

impl RetryBudget {
    pub fn new(max_attempts: u32, per_attempt_timeout: Duration, poll_interval: Duration) -> Self {
        Self { max_attempts, per_attempt_timeout, poll_interval }
    }

    /// Attempt numbers for the owning loop: 1..=max_attempts.
    pub fn attempts(&self) -> impl Iterator<Item = u32> {
        1..=self.max_attempts
    }
}
