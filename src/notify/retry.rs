//! Exponential backoff for notification retries.

use std::time::Duration;

/// How often and how late a failed delivery is retried.
///
/// The default matches the shop's mail schedule: three retries after the first attempt, waiting
/// 60s, 120s and 240s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Cap for a single delay.
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(3600),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (zero-based): `initial_delay * multiplier^retry`,
    /// capped at `max_delay`. A product too large for a `Duration` is `max_delay`.
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        if retry == 0 {
            return self.initial_delay.min(self.max_delay);
        }
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(self.initial_delay.as_secs_f64() * factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..policy.max_retries)
            .map(|retry| policy.delay_for_attempt(retry).as_secs())
            .collect();
        assert_eq!(delays, vec![60, 120, 240]);
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            max_delay: Duration::from_secs(100),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(100));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(100));
    }

    #[test]
    fn test_huge_retry_numbers_fall_back_to_the_cap() {
        let policy = RetryPolicy::default();
        for retry in [64, 1_100, u32::MAX] {
            assert_eq!(policy.delay_for_attempt(retry), policy.max_delay);
        }

        // An unbounded cap still never panics
        let policy = RetryPolicy {
            max_delay: Duration::MAX,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::MAX);
    }
}
