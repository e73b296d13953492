//! Exponential-backoff retry for the HTTP collaborators.
//!
//! Bundle loads deliberately do not retry here; the catalog's shared
//! in-flight futures mean a retry storm would fan out to every waiter, so
//! the caller owns that policy. Machine translation and content persistence
//! do retry, with a predicate so 4xx responses fail fast.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry behavior for one call site.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap on the backoff delay.
    pub max_delay: Duration,
    /// Backoff multiplier (2.0 doubles the delay each retry).
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Preset for machine-translation calls (3 attempts; delays 1s, 2s).
    pub fn machine_translation() -> Self {
        Self::new(3, Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_backoff_multiplier(2.0)
    }

    /// Preset for content persistence writes (3 attempts; delays 500ms, 1s).
    ///
    /// Flushes are already debounced, so keep the total wait short: a slow
    /// flush delays the next one.
    pub fn persistence() -> Self {
        Self::new(3, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(2))
            .with_backoff_multiplier(2.0)
    }

    /// Delay before the given 0-indexed attempt.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi((attempt - 1) as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::machine_translation()
    }
}

/// Run `operation` up to `config.max_attempts` times, retrying only while
/// `should_retry` approves the error.
///
/// # Panics
/// Panics if `config.max_attempts` is 0.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    assert!(
        config.max_attempts >= 1,
        "RetryConfig.max_attempts must be >= 1, got {}",
        config.max_attempts
    );

    let mut last_error: Option<E> = None;

    for attempt in 0..config.max_attempts {
        let delay = config.delay_for_attempt(attempt);
        if !delay.is_zero() {
            debug!(
                "{}: Retry attempt {}/{} after {:?}",
                operation_name,
                attempt + 1,
                config.max_attempts,
                delay
            );
            sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name,
                        attempt + 1,
                        config.max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    debug!(
                        "{}: Error is not retryable, failing immediately: {}",
                        operation_name, e
                    );
                    return Err(e);
                }

                let remaining = config.max_attempts - attempt - 1;
                if remaining > 0 {
                    warn!(
                        "{}: Attempt {}/{} failed ({}), {} retries remaining",
                        operation_name,
                        attempt + 1,
                        config.max_attempts,
                        e,
                        remaining
                    );
                } else {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, config.max_attempts, e
                    );
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}

/// Heuristic over error text: retry timeouts, connection problems, 429 and
/// 5xx; treat other client errors as permanent.
pub fn is_retryable_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    if lower.contains("429") || lower.contains("too many requests") {
        return true;
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return true;
    }
    if lower.contains("connection") || lower.contains("connect") {
        return true;
    }
    for status in ["500", "502", "503", "504"] {
        if lower.contains(status) {
            return true;
        }
    }
    false
}
