//! Bounded retry loops built on `tokio-retry2`.

use crate::RetryConfig;
use rehost_error::Classify;
use std::fmt::Display;
use std::future::Future;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Run `operation` up to `max_attempts` times, retrying only failures whose
/// [`Classify`] says they are retryable.
///
/// Permanent and transient failures return immediately. When the budget is
/// exhausted the last error is returned.
///
/// # Example
///
/// ```rust,ignore
/// let payload = retry_classified("fetch", config.max_fetch_attempts, &config, || {
///     fetcher.download_once(url)
/// })
/// .await?;
/// ```
pub async fn retry_classified<T, E, F, Fut>(
    operation_name: &str,
    max_attempts: u32,
    config: &RetryConfig,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    retry_when(
        operation_name,
        max_attempts,
        config,
        |e: &E| e.is_retryable(),
        operation,
    )
    .await
}

/// Run `operation` up to `max_attempts` times, retrying every failure.
///
/// Used for advisory calls (mapping lookups and upserts) where any error is
/// worth another try and the caller decides what exhaustion means.
pub async fn retry_all<T, E, F, Fut>(
    operation_name: &str,
    max_attempts: u32,
    config: &RetryConfig,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_when(operation_name, max_attempts, config, |_| true, operation).await
}

/// Run `operation` up to `max_attempts` times, retrying failures accepted by
/// `should_retry`.
pub async fn retry_when<T, E, F, Fut, P>(
    operation_name: &str,
    max_attempts: u32,
    config: &RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = max_attempts.max(1);
    let strategy = config.schedule().take(max_attempts as usize - 1);
    let should_retry = &should_retry;
    let mut attempt = 0u32;

    Retry::spawn(strategy, || {
        attempt += 1;
        let current = attempt;
        let fut = operation();
        async move {
            match fut.await {
                Ok(value) => {
                    if current > 1 {
                        debug!(operation = operation_name, attempt = current, "Succeeded after retry");
                    }
                    Ok(value)
                }
                Err(e) if should_retry(&e) && current < max_attempts => {
                    warn!(
                        operation = operation_name,
                        attempt = current,
                        max_attempts,
                        error = %e,
                        "Retryable failure, backing off"
                    );
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    debug!(
                        operation = operation_name,
                        attempt = current,
                        error = %e,
                        "Giving up"
                    );
                    Err(RetryError::Permanent(e))
                }
            }
        }
    })
    .await
}
