use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::adapters::{AdapterError, ScreenImage, TextGenerator};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let jitter = (base * 0.1 * jitter_fraction(attempt)) as u64;
        let delay = (base as u64).saturating_add(jitter).min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Deterministic pseudo-random fraction in `[0, 1)` per attempt.
fn jitter_fraction(attempt: u32) -> f64 {
    let x = attempt.wrapping_mul(2_654_435_761);
    (x % 100) as f64 / 100.0
}

/// Retries transient failures of the wrapped generator with exponential
/// backoff. Non-transient errors are returned immediately.
pub struct RetryingGenerator<T: TextGenerator> {
    inner: T,
    config: RetryConfig,
}

impl<T: TextGenerator> RetryingGenerator<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

impl<T: TextGenerator> TextGenerator for RetryingGenerator<T> {
    fn generate(&self, prompt: &str, image: Option<&ScreenImage>) -> Result<String, AdapterError> {
        let mut attempt = 0;
        loop {
            match self.inner.generate(prompt, image) {
                Ok(text) => return Ok(text),
                Err(e) if attempt >= self.config.max_retries || !e.is_transient() => {
                    return Err(e)
                }
                Err(e) => {
                    let delay = self.config.delay_for(attempt);
                    warn!(
                        model = self.inner.model_name(),
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying model request"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
