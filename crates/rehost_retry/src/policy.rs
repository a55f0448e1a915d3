//! Retry policy configuration and the backoff schedule derived from it.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempt budgets and backoff shape shared by every retry loop in the cache.
///
/// Delay before retry `n` (the 0-based attempt that just failed) is
/// `min(backoff_base^n, backoff_cap_seconds)` seconds plus uniform jitter in
/// `[0, jitter_max_seconds)`.
///
/// # Example
///
/// ```toml
/// [cache.retry]
/// max_fetch_attempts = 5
/// max_upload_attempts = 4
/// backoff_cap_seconds = 15.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per vendor download
    pub max_fetch_attempts: u32,
    /// Attempts per object-store upload
    pub max_upload_attempts: u32,
    /// Attempts per mapping lookup
    pub max_lookup_attempts: u32,
    /// Attempts per mapping upsert
    pub max_upsert_attempts: u32,
    /// Exponential base in seconds
    pub backoff_base: f64,
    /// Upper bound on the exponential part, in seconds
    pub backoff_cap_seconds: f64,
    /// Upper bound (exclusive) on the random jitter, in seconds
    pub jitter_max_seconds: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_fetch_attempts: 5,
            max_upload_attempts: 4,
            max_lookup_attempts: 3,
            max_upsert_attempts: 3,
            backoff_base: 2.0,
            backoff_cap_seconds: 15.0,
            jitter_max_seconds: 0.35,
        }
    }
}

impl RetryConfig {
    /// Policy with no waiting between attempts. Attempt budgets are kept.
    pub fn without_delays(mut self) -> Self {
        self.backoff_cap_seconds = 0.0;
        self.jitter_max_seconds = 0.0;
        self
    }

    /// Schedule of delays for this policy.
    pub fn schedule(&self) -> BackoffSchedule {
        BackoffSchedule::new(
            self.backoff_base,
            self.backoff_cap_seconds,
            self.jitter_max_seconds,
        )
    }
}

/// Endless iterator of backoff delays: capped exponential plus jitter.
///
/// Bound it with [`Iterator::take`]; the retry loop takes one fewer delay
/// than the attempt budget.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    base: f64,
    cap: f64,
    jitter_max: f64,
    attempt: i32,
}

impl BackoffSchedule {
    /// Create a schedule starting at attempt zero.
    pub fn new(base: f64, cap: f64, jitter_max: f64) -> Self {
        Self {
            base,
            cap,
            jitter_max,
            attempt: 0,
        }
    }

    /// Deterministic part of the delay after the given failed attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use rehost_retry::BackoffSchedule;
    /// use std::time::Duration;
    ///
    /// let schedule = BackoffSchedule::new(2.0, 15.0, 0.0);
    /// assert_eq!(schedule.base_delay(0), Duration::from_secs(1));
    /// assert_eq!(schedule.base_delay(3), Duration::from_secs(8));
    /// assert_eq!(schedule.base_delay(10), Duration::from_secs(15));
    /// ```
    pub fn base_delay(&self, attempt: i32) -> Duration {
        seconds(self.base.powi(attempt).min(self.cap))
    }

    fn jitter(&self) -> Duration {
        if self.jitter_max > 0.0 {
            seconds(rand::random::<f64>() * self.jitter_max)
        } else {
            Duration::ZERO
        }
    }
}

impl Iterator for BackoffSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.base_delay(self.attempt).saturating_add(self.jitter());
        self.attempt = self.attempt.saturating_add(1);
        Some(delay)
    }
}

fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}
