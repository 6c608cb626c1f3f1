//! Bounded exponential backoff for playback failures.
//!
//! Failures only retry while the controller still wants to play.  Each
//! failure bumps the retry counter; when the counter reaches the limit the
//! controller gives up (`Error` status, intent cleared) until the next
//! explicit play request.  The counter resets to 0 on every `Playing`
//! transition and on every explicit play.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_factor() -> f64 {
    1.5
}

fn default_max_retries() -> u32 {
    5
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            factor: default_factor(),
            max_retries: default_max_retries(),
        }
    }
}

/// Delay before the retry with counter value `retry_count` (1-based, i.e.
/// the value after the failure bumped it): base × factor^(count+1).
/// First retry with defaults: 1000 × 1.5² = 2250 ms.
pub fn backoff_delay(config: &RetryConfig, retry_count: u32) -> Duration {
    let millis = config.base_delay_ms as f64 * config.factor.powi(retry_count as i32 + 1);
    Duration::from_millis(millis as u64)
}
