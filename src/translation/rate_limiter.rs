/*!
 * Process-wide minimum-interval gate for outbound provider calls.
 *
 * A single limiter is shared by every provider in a run, so the interval
 * applies across vendors and across batch and single calls alike.
 */

use log::trace;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between the starts of consecutive calls
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum time between two call starts
    min_interval: Duration,

    // @field: Start of the last permitted call; held across the wait
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Create a limiter from a millisecond interval
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a call may start, then record the start
    ///
    /// The lock is held while sleeping, so concurrent callers queue up and
    /// each observes the timestamp written by the one before it.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!("Rate limiter waiting {:?}", wait);
                tokio::time::sleep(wait).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}
