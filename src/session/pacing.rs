//! Randomized pauses between remote calls

use rand::Rng;
use std::time::Duration;

/// A delay drawn uniformly from `[min, max]` seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomInterval {
    min: u64,
    max: u64,
}

impl RandomInterval {
    /// Creates an interval; bounds given in the wrong order are swapped
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn pick(&self) -> Duration {
        if self.min == self.max {
            return Duration::from_secs(self.min);
        }
        let low = self.min.saturating_mul(1000);
        let high = self.max.saturating_mul(1000);
        let millis = rand::rng().random_range(low..=high);
        Duration::from_millis(millis)
    }

    /// Sleeps for a freshly drawn delay
    pub async fn pause(&self) -> Duration {
        let delay = self.pick();
        if !delay.is_zero() {
            tracing::trace!("Pausing {:?}", delay);
            tokio::time::sleep(delay).await;
        }
        delay
    }
}
