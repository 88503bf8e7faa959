//! Retry schedule for transient API failures.
//!
//! The schedule is a plain iterator of `(attempt, delay)` pairs,
//! decoupled from any sleeping, so retry behavior is testable without
//! waiting. Jitter is strictly additive (up to `jitter` of the current
//! delay) and the cap is applied after it, which keeps successive delays
//! monotonically non-decreasing: each exponential step doubles, which
//! outgrows any added jitter, and capped delays are all equal.

use rand::Rng;
use std::time::Duration;

/// Retry policy configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. 1 disables retries.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay (before jitter).
    pub max_delay: Duration,
    /// Additive jitter as a fraction of the delay, in `[0.0, 1.0]`.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: 0.2,
        }
    }
}

/// Bounded iterator of `(attempt, delay)` pairs for one request.
///
/// Yields nothing when the policy allows a single attempt. `attempt`
/// counts retries starting at 1.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    policy: RetryPolicy,
    attempt: u32,
}

impl RetrySchedule {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, attempt: 0 }
    }
}

impl Iterator for RetrySchedule {
    type Item = (u32, Duration);

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempt + 1 >= self.policy.max_attempts {
            return None;
        }
        let exp = self
            .policy
            .base_delay
            .saturating_mul(2u32.saturating_pow(self.attempt));

        let jittered = if self.policy.jitter > 0.0 {
            exp.mul_f64(1.0 + rand::thread_rng().gen_range(0.0..=self.policy.jitter))
        } else {
            exp
        };
        // Cap after jitter so delays pinned at the ceiling stay equal
        // rather than wobbling back down.
        let delay = jittered.min(self.policy.max_delay);

        self.attempt += 1;
        Some((self.attempt, delay))
    }
}
