//! Politeness pauses between comment page fetches
//!
//! The pause is per article: it is taken before each numbered comment page
//! request and never spans articles or listing pages.

use crate::config::CrawlerConfig;
use rand::Rng;
use std::time::Duration;

/// Randomized delay between successive page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Pacer {
    /// Creates a pacer for the inclusive range `[min, max]`
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Builds the pacer from the configured page delay range
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.min_page_delay),
            Duration::from_millis(config.max_page_delay),
        )
    }

    /// Returns true if the pacer never waits
    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Draws the next delay from the configured range
    pub fn next_delay(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }

        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    /// Sleeps for a randomly drawn delay
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Pausing {:?} before next page", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
