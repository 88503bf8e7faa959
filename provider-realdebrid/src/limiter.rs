//! Token-bucket rate limiting.
//!
//! One process-wide [`RateLimiter`] instance is shared by every account
//! client so the combined call rate of all jobs stays within the API
//! limits. The torrents listing endpoint has a stricter documented limit
//! than the rest of the API, hence the second bucket.
//!
//! Refill is computed lazily on each `acquire` from the elapsed time
//! since the last refill; there is no background ticking task.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Which bucket a call draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// Generic API calls.
    General,
    /// `/torrents` listing pages.
    Torrents,
}

struct BucketState {
    capacity: f64,
    refill_per_minute: f64,
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn new(per_minute: u32) -> Self {
        let capacity = f64::from(per_minute.max(1));
        Self {
            capacity,
            refill_per_minute: capacity,
            // Start full so a fresh process can burst up to the per-minute
            // allowance before throttling kicks in.
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.last_refill);
        let new_tokens = elapsed.as_secs_f64() / 60.0 * self.refill_per_minute;
        if new_tokens > 0.0 {
            self.tokens = (self.tokens + new_tokens).min(self.capacity);
            self.last_refill = now;
        }
    }

    /// Time until one token is available, or `None` if a token was taken.
    fn try_take(&mut self, now: Instant) -> Option<Duration> {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            return None;
        }
        let deficit = 1.0 - self.tokens;
        Some(Duration::from_secs_f64(
            deficit * 60.0 / self.refill_per_minute,
        ))
    }
}

/// Process-wide token buckets bounding outbound API calls per minute.
///
/// Constructed once at startup and injected into every
/// [`RealDebridClient`](crate::client::RealDebridClient); never a
/// module-level singleton.
pub struct RateLimiter {
    general: Mutex<BucketState>,
    torrents: Mutex<BucketState>,
}

impl RateLimiter {
    pub fn new(general_per_minute: u32, torrents_per_minute: u32) -> Self {
        Self {
            general: Mutex::new(BucketState::new(general_per_minute)),
            torrents: Mutex::new(BucketState::new(torrents_per_minute)),
        }
    }

    /// Block until a token is available, then consume it.
    ///
    /// Never fails; under sustained starvation this waits indefinitely.
    /// Callers that need bounded waiting wrap it in their own timeout.
    pub async fn acquire(&self, bucket: Bucket) {
        let state = match bucket {
            Bucket::General => &self.general,
            Bucket::Torrents => &self.torrents,
        };

        loop {
            // The lock is released while sleeping so other callers can
            // refill and contend fairly.
            let wait = {
                let mut guard = state.lock().await;
                guard.try_take(Instant::now())
            };
            match wait {
                None => return,
                Some(wait) => {
                    trace!(?bucket, wait_ms = wait.as_millis() as u64, "rate limited");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}
