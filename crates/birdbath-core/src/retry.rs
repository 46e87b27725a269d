//! Bounded retry with a fixed inter-attempt delay.

use std::time::Duration;

/// Retry policy for a single identifier: attempt ceiling plus the pause
/// between attempts (there is no pause after the final one).
///
/// A plain value so tests can swap in `Duration::ZERO` instead of waiting
/// out real delays. `max_attempts` of 1 is the degraded no-retry variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Run `attempt_fn` up to the policy ceiling.
///
/// Every failed attempt is logged at debug level (it lands in the
/// diagnostic file, not the console); all error kinds are retried the
/// same way. Returns the last error on exhaustion.
pub fn retry_with_policy<T, E: std::fmt::Display>(
    policy: &RetryPolicy,
    label: &str,
    mut attempt_fn: impl FnMut() -> Result<T, E>,
) -> Result<T, E> {
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max => {
                log::debug!("{label}: attempt {attempt}/{max} failed: {e}, retrying...");
                attempt += 1;
                std::thread::sleep(policy.delay);
            }
            Err(e) => {
                log::debug!("{label}: attempt {attempt}/{max} failed: {e}");
                return Err(e);
            }
        }
    }
}
