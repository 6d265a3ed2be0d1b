//! Bounded retry with exponential backoff.
//!
//! Launch configuration calls are retried inside a fixed wall-clock window
//! while AWS catches up with eventually consistent state (IAM instance
//! profiles right after creation, a launch configuration right after it was
//! created). Which errors are worth retrying is decided by the caller.

use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for retrying an operation with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Initial delay between attempts
    pub initial_delay: Duration,
    /// Maximum delay between attempts (cap for exponential growth)
    pub max_delay: Duration,
    /// Wall-clock window after which the last error is returned
    pub timeout: Duration,
    /// Add randomness to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default backoff bounded by the given window
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// window in `config` runs out.
///
/// # Arguments
/// * `config` - Backoff and window configuration
/// * `op` - Async operation to attempt
/// * `should_retry` - Returns `true` for errors worth another attempt
/// * `description` - What is being attempted, for logging
///
/// # Returns
/// * `Ok(T)` - The first successful result
/// * `Err(E)` - The first non-retryable error, or the last retryable one
///   once the window is exhausted
///
/// # Example
/// ```ignore
/// retry_within(
///     RetryConfig::with_timeout(Duration::from_secs(90)),
///     || client.create_launch_configuration(&request),
///     AwsError::is_propagation_delay,
///     "create launch configuration",
/// ).await?;
/// ```
pub async fn retry_within<T, E, F, Fut, R>(
    config: RetryConfig,
    mut op: F,
    should_retry: R,
    description: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let mut builder = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_max_times(usize::MAX);
    if config.jitter {
        builder = builder.with_jitter();
    }
    let mut delays = builder.build();

    loop {
        attempts += 1;

        let err = match op().await {
            Ok(value) => {
                if attempts > 1 {
                    debug!(operation = %description, attempts, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&err) {
            return Err(err);
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            warn!(
                operation = %description,
                attempts,
                timeout_secs = config.timeout.as_secs(),
                error = %err,
                "Retry window exhausted"
            );
            return Err(err);
        }

        let delay = delays
            .next()
            .unwrap_or(config.max_delay)
            .min(config.timeout - elapsed);
        warn!(
            operation = %description,
            attempt = attempts,
            delay_ms = delay.as_millis(),
            error = %err,
            "Retryable error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(timeout: Duration) -> RetryConfig {
        RetryConfig {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            timeout,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn succeeds_immediately() {
        let result: Result<u32, String> = retry_within(
            fast(Duration::from_secs(1)),
            || async { Ok(7) },
            |_| true,
            "immediate",
        )
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<u32, String> = retry_within(
            fast(Duration::from_secs(5)),
            || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                    if n >= 3 { Ok(n) } else { Err("not yet".to_string()) }
                }
            },
            |_| true,
            "eventual",
        )
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_fast() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<(), String> = retry_within(
            fast(Duration::from_secs(5)),
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("fatal".to_string())
                }
            },
            |e| e != "fatal",
            "fatal",
        )
        .await;

        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn window_exhaustion_returns_last_error() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<(), String> = retry_within(
            fast(Duration::from_millis(100)),
            || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(format!("attempt {n}"))
                }
            },
            |_| true,
            "never",
        )
        .await;

        let attempts = counter.load(Ordering::SeqCst);
        assert!(attempts > 1);
        assert_eq!(result.unwrap_err(), format!("attempt {attempts}"));
    }
}
