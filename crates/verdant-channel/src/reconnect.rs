//! Reconnect policy: exponential backoff with jitter and attempt caps.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Maximum consecutive attempts before the channel gives up.
    pub max_attempts: u32,
    /// Base delay for exponential backoff.
    pub base_delay_ms: u64,
    /// Ceiling on the delay between attempts.
    pub max_delay_ms: u64,
    /// Backoff multiplier applied per attempt.
    pub backoff_multiplier: f64,
    /// Reset the attempt counter after a successful connection.
    pub reset_on_success: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            reset_on_success: true,
        }
    }
}

impl ReconnectConfig {
    /// Backoff delay before the given 1-based attempt, with up to 10%
    /// random jitter so reconnect storms spread out.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let base = (self.base_delay_ms as f64 * exp).min(self.max_delay_ms as f64);
        let jitter = rand::thread_rng().gen_range(0.0..=0.1);
        Duration::from_millis((base * (1.0 + jitter)) as u64)
    }
}

/// Counters for reconnection activity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReconnectStats {
    /// Total reconnection attempts made.
    pub total_attempts: u64,
    /// Successful reconnections.
    pub successful_reconnects: u64,
    /// Times the retry budget was exhausted.
    pub exhausted: u64,
    /// Frames dropped because they failed to decode.
    pub undecodable_frames: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let config = ReconnectConfig {
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            backoff_multiplier: 2.0,
            ..ReconnectConfig::default()
        };
        let d1 = config.delay_for_attempt(1);
        let d3 = config.delay_for_attempt(3);
        let d10 = config.delay_for_attempt(10);
        assert!(d1 >= Duration::from_millis(100));
        assert!(d1 <= Duration::from_millis(110));
        assert!(d3 >= Duration::from_millis(400));
        // attempt 10 would be 100 * 2^9 = 51_200 without the cap
        assert!(d10 <= Duration::from_millis(1_100));
    }
}
