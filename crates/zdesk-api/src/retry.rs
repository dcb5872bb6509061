//! Retry with exponential backoff for Zendesk API requests.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bounds on retry behavior for transient API errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Initial delay in milliseconds before the first retry.
    pub initial_delay_ms: u64,
    /// Maximum backoff delay in milliseconds between retries.
    pub max_delay_ms: u64,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_factor: 2.0,
        }
    }
}

/// Calculate the delay in milliseconds before the next retry attempt.
///
/// Exponential backoff `initial_delay_ms * backoff_factor^attempt` with
/// ±25% jitter, clamped to `max_delay_ms`. A `Retry-After` signal from the
/// service is a floor: the next attempt waits at least the advertised
/// duration, even past the clamp.
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32, retry_after_ms: Option<u64>) -> u64 {
    let base = policy.initial_delay_ms as f64 * policy.backoff_factor.powi(attempt as i32);
    let clamped = base.min(policy.max_delay_ms as f64);

    let jitter_factor = rand::rng().random_range(0.75..=1.25);
    let delay = ((clamped * jitter_factor) as u64).min(policy.max_delay_ms);

    match retry_after_ms {
        Some(floor) => delay.max(floor),
        None => delay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.initial_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 30_000);
        assert!((policy.backoff_factor - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay_ms: 1000,
            max_delay_ms: 60_000,
            backoff_factor: 2.0,
        };

        // Attempt 0: base 1000, jitter ±25% → [750, 1250]
        let delay0 = backoff_delay(&policy, 0, None);
        assert!((750..=1250).contains(&delay0), "delay0={delay0}");

        // Attempt 2: base 4000, jitter ±25% → [3000, 5000]
        let delay2 = backoff_delay(&policy, 2, None);
        assert!((3000..=5000).contains(&delay2), "delay2={delay2}");
    }

    #[test]
    fn backoff_capped_at_max() {
        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay_ms: 1000,
            max_delay_ms: 5000,
            backoff_factor: 10.0,
        };
        let delay = backoff_delay(&policy, 5, None);
        assert!(delay <= policy.max_delay_ms, "delay={delay}");
    }

    #[test]
    fn retry_after_is_a_floor() {
        let policy = RetryPolicy {
            initial_delay_ms: 10,
            ..RetryPolicy::default()
        };
        // Advertised wait far above the computed backoff: must be honored.
        let delay = backoff_delay(&policy, 0, Some(8000));
        assert!(delay >= 8000, "delay={delay}");
    }

    #[test]
    fn retry_after_floor_beats_the_clamp() {
        let policy = RetryPolicy {
            max_delay_ms: 1000,
            ..RetryPolicy::default()
        };
        let delay = backoff_delay(&policy, 0, Some(5000));
        assert!(delay >= 5000, "delay={delay}");
    }

    #[test]
    fn short_retry_after_does_not_shrink_backoff() {
        let policy = RetryPolicy {
            initial_delay_ms: 4000,
            backoff_factor: 1.0,
            ..RetryPolicy::default()
        };
        // Backoff is [3000, 5000] with jitter; a 1ms Retry-After is a floor,
        // not an override.
        let delay = backoff_delay(&policy, 0, Some(1));
        assert!(delay >= 3000, "delay={delay}");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let policy: RetryPolicy = toml::from_str("max_retries = 5").unwrap();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.initial_delay_ms, 500);
    }
}
