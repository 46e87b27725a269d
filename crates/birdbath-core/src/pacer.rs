//! Randomized inter-request pacing.

use std::time::Duration;

use rand::Rng;

/// Jittered delay inserted after every processed identifier to keep the
/// request cadence human-looking. Not a rate limiter: no token bucket,
/// no adaptation to observed throttling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min: Duration,
    max: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(2500),
        }
    }
}

impl Pacer {
    /// Bounds are reordered if given backwards.
    pub fn new(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    /// Sample one delay from Uniform(min, max).
    pub fn jitter(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Sleep for one jittered interval.
    pub fn pause(&self) {
        std::thread::sleep(self.jitter());
    }
}
