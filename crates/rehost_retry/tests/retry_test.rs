//! Tests for classified retry loops and the concurrency limiter.

use rehost_error::{FetchError, FetchErrorKind};
use rehost_retry::{ConcurrencyLimiter, RetryConfig, retry_all, retry_classified};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

fn fast() -> RetryConfig {
    RetryConfig::default().without_delays()
}

fn status(code: u16) -> FetchError {
    FetchError::new(FetchErrorKind::Status {
        status: code,
        url: "https://vendor.example/a.jpg".into(),
    })
}

#[tokio::test]
async fn test_retryable_failures_are_retried_until_success() {
    let calls = AtomicUsize::new(0);
    let result: Result<&str, FetchError> = retry_classified("fetch", 5, &fast(), || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move { if n < 2 { Err(status(503)) } else { Ok("bytes") } }
    })
    .await;

    assert_eq!(result.unwrap(), "bytes");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_permanent_failure_stops_immediately() {
    let calls = AtomicUsize::new(0);
    let result: Result<(), FetchError> = retry_classified("fetch", 5, &fast(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(FetchError::new(FetchErrorKind::NotFound("u".into()))) }
    })
    .await;

    assert!(matches!(result.unwrap_err().kind, FetchErrorKind::NotFound(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_failure_is_not_retried() {
    let calls = AtomicUsize::new(0);
    let result: Result<(), FetchError> = retry_classified("fetch", 5, &fast(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err(status(403)) }
    })
    .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhaustion_returns_last_error() {
    let calls = AtomicUsize::new(0);
    let result: Result<(), FetchError> = retry_classified("fetch", 4, &fast(), || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move { Err(status(if n == 3 { 504 } else { 429 })) }
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(matches!(err.kind, FetchErrorKind::Status { status: 504, .. }));
}

#[tokio::test]
async fn test_zero_budget_still_attempts_once() {
    let calls = AtomicUsize::new(0);
    let _: Result<(), String> = retry_all("lookup", 0, &fast(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("db down".to_string()) }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_all_ignores_classification() {
    let calls = AtomicUsize::new(0);
    let result: Result<(), String> = retry_all("upsert", 3, &fast(), || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err("constraint".to_string()) }
    })
    .await;

    assert_eq!(result.unwrap_err(), "constraint");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_first_retry_waits_at_least_one_second() {
    let config = RetryConfig {
        jitter_max_seconds: 0.0,
        ..RetryConfig::default()
    };
    let calls = AtomicUsize::new(0);
    let started = Instant::now();
    let result: Result<(), FetchError> = retry_classified("fetch", 5, &config, || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move { if n == 0 { Err(status(503)) } else { Ok(()) } }
    })
    .await;

    assert!(result.is_ok());
    assert!(started.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn test_limiter_bounds_in_flight_tasks() {
    let limiter = ConcurrencyLimiter::new(2);
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            tokio::spawn(async move {
                let _guard = limiter.acquire().await.unwrap();
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(limiter.available(), 2);
}

#[tokio::test]
async fn test_limiter_minimum_is_one() {
    let limiter = ConcurrencyLimiter::new(0);
    assert_eq!(limiter.max_concurrent(), 1);

    let guard = limiter.try_acquire().unwrap();
    assert!(limiter.try_acquire().is_none());
    drop(guard);
    assert!(limiter.try_acquire().is_some());
}
