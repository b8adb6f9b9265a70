//! Retry policies for HTTP requests.

use std::time::Duration;

/// Retry policy for an HTTP request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// No retries. Every mutation uses this: a cart add sent twice adds twice.
    #[default]
    None,
    /// Retry on transport failures + 429/502/503/504. Default for GETs.
    Idempotent,
    /// Caller-provided retry logic.
    Custom(RetryConfig),
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries, not counting the initial request.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// ±25% random spread on each delay.
    pub jitter: bool,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    pub fn idempotent() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base =
            self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let spread = capped * 0.25;
            (capped + (rand::random::<f64>() - 0.5) * 2.0 * spread).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }

    pub(crate) fn retries_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> RetryConfig {
        RetryConfig {
            jitter: false,
            ..RetryConfig::idempotent()
        }
    }

    #[test]
    fn test_mutations_do_not_retry_by_default() {
        assert!(matches!(RetryPolicy::default(), RetryPolicy::None));
    }

    #[test]
    fn test_idempotent_retries_gateway_errors() {
        let config = RetryConfig::idempotent();
        for status in [429, 502, 503, 504] {
            assert!(config.retries_status(status), "{}", status);
        }
        assert!(!config.retries_status(500));
        assert!(!config.retries_status(404));
    }

    #[test]
    fn test_backoff_doubles() {
        let config = no_jitter();
        let delays: Vec<u128> = (0..3).map(|a| config.delay_for_attempt(a).as_millis()).collect();
        assert_eq!(delays, vec![300, 600, 1200]);
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_millis(500),
            ..no_jitter()
        };
        assert_eq!(config.delay_for_attempt(4).as_millis(), 500);
    }

    #[test]
    fn test_jitter_stays_within_a_quarter() {
        let config = RetryConfig::idempotent();
        for _ in 0..50 {
            let ms = config.delay_for_attempt(1).as_millis();
            assert!((450..=750).contains(&ms), "{}", ms);
        }
    }
}
