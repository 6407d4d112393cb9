//! Retry with Exponential Backoff

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

/// Retry policy for fallible fetches at the provider boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,
    /// Multiplier applied to the delay after every failure
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 2000,
            backoff_factor: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.initial_delay_ms as f64 * self.backoff_factor.powi(exponent);
        Duration::from_millis(millis.max(0.0) as u64)
    }

    /// Run `op` until it succeeds or the attempts are used up. The closure
    /// receives the 1-based attempt number; exhaustion returns the last error.
    pub fn run<T, E, F>(&self, operation: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    error!("{} failed after {} attempts: {}", operation, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}. Retrying in {:?}",
                        operation, attempt, attempts, e, delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
