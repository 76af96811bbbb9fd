//! Retry policies for config fetches.

use std::future::Future;
use std::time::Duration;

use crate::error::HttpError;

/// Retry policy for a config fetch.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// Single attempt.
    None,
    /// Retry on transport failures, 429 and 502/503/504. Config fetches are
    /// plain GETs, so this is the default.
    #[default]
    Idempotent,
    /// User-provided retry logic.
    Custom(RetryConfig),
}

impl RetryPolicy {
    /// The retry schedule, or `None` for a single attempt.
    pub fn config(&self) -> Option<RetryConfig> {
        match self {
            RetryPolicy::None => None,
            RetryPolicy::Idempotent => Some(RetryConfig::idempotent()),
            RetryPolicy::Custom(config) => Some(config.clone()),
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Spread each delay by up to ±25%.
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
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.initial_delay.as_millis() as f64
            * self.backoff_factor.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_millis() as f64);

        let final_ms = if self.jitter {
            let jitter_range = capped * 0.25;
            let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
            (capped + jitter).max(0.0)
        } else {
            capped
        };

        Duration::from_millis(final_ms as u64)
    }

    /// Whether `err` is worth another attempt.
    pub fn should_retry(&self, err: &HttpError) -> bool {
        match err {
            HttpError::ServerError { status, .. } => self.retryable_statuses.contains(status),
            HttpError::RateLimited => self.retryable_statuses.contains(&429),
            HttpError::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or runs
    /// out of attempts. Exhausting the attempts yields `MaxRetriesExceeded`.
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> Result<T, HttpError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HttpError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !self.should_retry(&e) => return Err(e),
                Err(e) => e,
            };
            if attempt >= self.max_retries {
                return Err(HttpError::MaxRetriesExceeded {
                    attempts: attempt + 1,
                    last_error: err.to_string(),
                });
            }

            let delay = self.delay_for_attempt(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                max = self.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying config fetch from {}",
                target
            );
            futures_timer::Delay::new(delay).await;
            attempt += 1;
        }
    }
}
