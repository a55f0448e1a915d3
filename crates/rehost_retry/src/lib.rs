//! Retry and admission control for the rehost media cache.
//!
//! - [`RetryConfig`] and [`BackoffSchedule`]: attempt budgets and the capped
//!   exponential delay with jitter
//! - [`retry_classified`]: retries only failures classified as retryable
//! - [`ConcurrencyLimiter`]: semaphore bounding in-flight resolutions

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod limiter;
mod policy;
mod retry;

pub use limiter::{ConcurrencyLimiter, LimiterGuard};
pub use policy::{BackoffSchedule, RetryConfig};
pub use retry::{retry_all, retry_classified, retry_when};
