//! Vendor downloads with status-aware retry.

use crate::VendorConfig;
use bytes::Bytes;
use rehost_core::normalize_content_type;
use rehost_error::{FetchError, FetchErrorKind, RehostResult};
use rehost_retry::{RetryConfig, retry_classified};
use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bytes and declared type of a downloaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
    /// Raw response body
    pub bytes: Bytes,
    /// Normalized `Content-Type`, if the vendor sent one
    pub content_type: Option<String>,
}

/// HTTP client for vendor image URLs.
///
/// 404 fails immediately and permanently. 429, 5xx gateway errors, timeouts
/// and connection failures are retried with backoff. Any other non-success
/// status fails this call without retry.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Build a fetcher with the vendor's timeouts and user agent.
    pub fn new(vendor: &VendorConfig, retry: RetryConfig) -> RehostResult<Self> {
        let client = Client::builder()
            .user_agent(vendor.user_agent.as_str())
            .connect_timeout(Duration::from_secs(vendor.connect_timeout_seconds))
            .read_timeout(Duration::from_secs(vendor.read_timeout_seconds))
            .build()
            .map_err(|e| FetchError::new(FetchErrorKind::Client(e.to_string())))?;
        Ok(Self { client, retry })
    }

    /// Download `url`, retrying retryable failures up to the fetch budget.
    #[instrument(skip(self))]
    pub async fn download(&self, url: &str) -> RehostResult<FetchedPayload> {
        let payload = retry_classified(
            "fetch",
            self.retry.max_fetch_attempts,
            &self.retry,
            || self.download_once(url),
        )
        .await?;
        Ok(payload)
    }

    /// One download attempt.
    pub async fn download_once(&self, url: &str) -> Result<FetchedPayload, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(e, url))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::new(FetchErrorKind::NotFound(url.to_string())));
        }
        if !status.is_success() {
            return Err(FetchError::new(FetchErrorKind::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }));
        }

        let content_type = normalize_content_type(
            response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let bytes = response.bytes().await.map_err(|e| request_error(e, url))?;

        debug!(size = bytes.len(), content_type = ?content_type, "Downloaded");
        Ok(FetchedPayload {
            bytes,
            content_type,
        })
    }
}

fn request_error(e: reqwest::Error, url: &str) -> FetchError {
    let detail = format!("{}: {}", url, e);
    let kind = if e.is_timeout() {
        FetchErrorKind::Timeout(detail)
    } else if e.is_builder() {
        FetchErrorKind::Client(detail)
    } else if e.is_body() || e.is_decode() {
        FetchErrorKind::Body(detail)
    } else {
        FetchErrorKind::Connection(detail)
    };
    FetchError::new(kind)
}
