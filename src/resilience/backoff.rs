//! Retry pacing for handler construction.
//!
//! Two strategies are available:
//! - [`BackoffStrategy::Constant`] waits the same interval after every failure;
//! - [`BackoffStrategy::Exponential`] grows the interval by a factor of 1.6 per
//!   attempt, samples uniformly between the base delay and the grown value, and
//!   never exceeds [`MAX_DELAY`].

use std::time::Duration;
use rand::Rng;

/// Upper bound for any delay produced by [`BackoffStrategy::Exponential`].
pub const MAX_DELAY: Duration = Duration::from_secs(1000);

/// Base delay used when an exponential strategy is configured with zero.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default interval between failed attempts.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(10);

const FACTOR: f64 = 1.6;

/// Largest magnitude (in seconds) that still fits a signed 64-bit nanosecond count.
const OVERFLOW_THRESHOLD_SECS: f64 = (i64::MAX - 512) as f64 / 1e9;

/// Policy computing the delay before the next construction attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackoffStrategy {
    /// Always wait `delay`.
    Constant { delay: Duration },
    /// Exponentially growing, jittered delay.
    Exponential {
        /// Lower bound of every delay.
        base_delay: Duration,
        /// Number of delays handed out so far.
        attempt: u32,
    },
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::constant(DEFAULT_RETRY_AFTER)
    }
}

impl BackoffStrategy {
    pub fn constant(delay: Duration) -> Self {
        Self::Constant { delay }
    }

    /// Exponential strategy starting at `base_delay` (100ms if zero).
    pub fn exponential(base_delay: Duration) -> Self {
        Self::Exponential {
            base_delay,
            attempt: 0,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Exponential { .. } => "exponential",
        }
    }

    /// Compute the next delay.
    ///
    /// For the exponential variant this advances the internal attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        match self {
            Self::Constant { delay } => *delay,
            Self::Exponential {
                base_delay,
                attempt,
            } => {
                let min = if base_delay.is_zero() {
                    DEFAULT_BASE_DELAY
                } else {
                    *base_delay
                };
                if min >= MAX_DELAY {
                    return MAX_DELAY;
                }

                let exponent = (*attempt).min(i32::MAX as u32) as i32;
                let min_secs = min.as_secs_f64();
                let raw_secs = min_secs * FACTOR.powi(exponent);
                *attempt = attempt.saturating_add(1);

                // `from_secs_f64` panics on values this large
                if !raw_secs.is_finite() || raw_secs > OVERFLOW_THRESHOLD_SECS {
                    return MAX_DELAY;
                }

                let sampled_secs = if raw_secs > min_secs {
                    rand::thread_rng().gen_range(min_secs..=raw_secs)
                } else {
                    min_secs
                };

                Duration::from_secs_f64(sampled_secs).clamp(min, MAX_DELAY)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_is_idempotent() {
        let mut strategy = BackoffStrategy::constant(Duration::from_millis(250));
        for _ in 0..10 {
            assert_eq!(strategy.next_delay(), Duration::from_millis(250));
        }
        assert_eq!(strategy, BackoffStrategy::constant(Duration::from_millis(250)));
    }

    #[test]
    fn test_default_is_ten_second_constant() {
        let mut strategy = BackoffStrategy::default();
        assert_eq!(strategy.kind(), "constant");
        assert_eq!(strategy.next_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_first_delay_within_first_step() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_millis(100));
        let first = strategy.next_delay();
        assert!(first >= Duration::from_millis(100), "first = {:?}", first);
        assert!(first <= Duration::from_millis(160), "first = {:?}", first);
    }

    #[test]
    fn test_exponential_second_delay_within_grown_range() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_millis(100));
        strategy.next_delay();
        let second = strategy.next_delay();
        assert!(second >= Duration::from_millis(100));
        assert!(second <= Duration::from_millis(161));
    }

    #[test]
    fn test_exponential_zero_base_defaults() {
        let mut strategy = BackoffStrategy::exponential(Duration::ZERO);
        for _ in 0..20 {
            assert!(strategy.next_delay() >= DEFAULT_BASE_DELAY);
        }
    }

    #[test]
    fn test_exponential_stays_within_bounds() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_millis(100));
        for call in 0..200 {
            let delay = strategy.next_delay();
            assert!(
                delay >= Duration::from_millis(100) && delay <= MAX_DELAY,
                "call {}: delay {:?} out of bounds",
                call,
                delay
            );
        }
    }

    #[test]
    fn test_exponential_after_fifty_calls_is_capped() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_millis(100));
        for _ in 0..50 {
            strategy.next_delay();
        }
        assert!(strategy.next_delay() <= MAX_DELAY);
    }

    #[test]
    fn test_exponential_overflow_returns_max() {
        let mut strategy = BackoffStrategy::Exponential {
            base_delay: Duration::from_millis(100),
            attempt: 10_000,
        };
        assert_eq!(strategy.next_delay(), MAX_DELAY);

        let mut saturated = BackoffStrategy::Exponential {
            base_delay: Duration::from_millis(100),
            attempt: u32::MAX,
        };
        assert_eq!(saturated.next_delay(), MAX_DELAY);
        assert_eq!(saturated.next_delay(), MAX_DELAY);
    }

    #[test]
    fn test_exponential_base_above_max_saturates() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_secs(5000));
        assert_eq!(strategy.next_delay(), MAX_DELAY);
    }

    #[test]
    fn test_exponential_counter_advances() {
        let mut strategy = BackoffStrategy::exponential(Duration::from_millis(100));
        strategy.next_delay();
        strategy.next_delay();
        match strategy {
            BackoffStrategy::Exponential { attempt, .. } => assert_eq!(attempt, 2),
            other => panic!("unexpected strategy {:?}", other),
        }
    }
}
