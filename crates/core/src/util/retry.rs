//! Exponential backoff for the external collaborators.
//!
//! Transcription and generation both ride on HTTP services that throttle and
//! hiccup; transient failures are retried with exponential backoff while
//! permanent ones surface immediately.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            ..Default::default()
        }
    }

    /// No retries at all. Used by tests that assert on call counts.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis(scaled as u64).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, the error is not retryable, or the
/// attempt budget is spent. The last error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "operation recovered");
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_attempts && is_retryable(&e) => {
                let delay = config.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts = config.max_attempts,
                    ?delay,
                    "operation failed, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Whether an HTTP status is worth retrying: timeouts, throttling and
/// server-side failures.
pub fn is_http_retryable(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}
