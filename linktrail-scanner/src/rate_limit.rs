use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::trace;

/// Minimum-interval gate shared by every request of one crawl.
///
/// Not per host: the interval applies to the aggregate request stream.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Option<Instant>,
}

impl RateLimiter {
    /// `requests_per_second` must be positive and finite; anything else
    /// disables throttling. Rates too small to express as an interval
    /// saturate at `Duration::MAX`.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::try_from_secs_f64(1.0 / requests_per_second).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait out the full interval since the last permitted request.
    pub async fn acquire(&mut self) {
        self.acquire_scaled(1.0).await;
    }

    /// Wait out `fraction` of the interval since the last permitted request.
    pub async fn acquire_scaled(&mut self, fraction: f64) {
        let wanted = if self.interval.is_zero() {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(self.interval.as_secs_f64() * fraction.max(0.0))
                .unwrap_or(Duration::MAX)
        };
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < wanted {
                let wait = wanted - elapsed;
                trace!("Rate limiter sleeping {:?}", wait);
                sleep(wait).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
