//! Politeness delay between outbound article fetches
//!
//! The limiter enforces a fixed minimum interval between consecutive
//! requests. The first request never waits.

use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Fixed-interval rate limiter for a single sequential worker
#[derive(Debug, Clone)]
pub struct RateLimiter {
    delay: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter enforcing `delay` between requests
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: None,
        }
    }

    /// Creates a limiter from a delay in milliseconds
    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    /// The configured interval
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Time left before the next request may go out
    pub fn time_until_ready(&self) -> Duration {
        match self.last_request {
            Some(last) => self.delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Waits until the interval since the previous request has elapsed,
    /// then records the current request
    pub async fn wait(&mut self) {
        let remaining = self.time_until_ready();
        if !remaining.is_zero() {
            tracing::trace!("Politeness delay: waiting {:?}", remaining);
            sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }
}
