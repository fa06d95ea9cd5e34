//! Pacing between dependent sequential requests
//!
//! Every pagination stream waits between page *i* and page *i+1*, modeling
//! human browsing cadence. The wait is the base delay plus a uniformly
//! random jitter. Independent pool tasks are never paced here; their only
//! limit is the pool width.

use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

/// Base delay plus bounded random jitter
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    base: Duration,
    jitter: Duration,
}

impl RateLimitPolicy {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.jitter_ms),
        )
    }

    /// Draws one concrete delay
    pub fn sample(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.base + Duration::from_millis(jitter_ms)
    }

    /// Waits out one sampled delay
    pub async fn pause(&self) {
        let delay = self.sample();
        tracing::debug!(?delay, "pacing before next page");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_without_jitter_is_base() {
        let policy = RateLimitPolicy::new(Duration::from_millis(250), Duration::ZERO);
        assert_eq!(policy.sample(), Duration::from_millis(250));
    }

    #[test]
    fn test_sample_stays_within_bounds() {
        let policy = RateLimitPolicy::new(Duration::from_millis(100), Duration::from_millis(50));
        for _ in 0..100 {
            let delay = policy.sample();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_from_config() {
        let config = PacingConfig {
            base_delay_ms: 1_000,
            jitter_ms: 2_000,
        };
        let policy = RateLimitPolicy::from_config(&config);
        let delay = policy.sample();
        assert!(delay >= Duration::from_millis(1_000));
        assert!(delay <= Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_sleeps_sampled_delay() {
        let policy = RateLimitPolicy::new(Duration::from_millis(500), Duration::ZERO);
        let before = tokio::time::Instant::now();
        policy.pause().await;
        assert!(before.elapsed() >= Duration::from_millis(500));
    }
}
