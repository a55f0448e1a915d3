//! Vercel-Blob-compatible HTTP object store.

use crate::{ObjectStore, PutOptions, StoredObject};
use bytes::Bytes;
use rehost_error::{RehostResult, StorageError, StorageErrorKind};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

const API_VERSION: &str = "7";
const CONFLICT_CODES: [&str; 2] = ["blob_already_exists", "already_exists"];

/// Object store speaking the Vercel Blob HTTP API.
///
/// Uploads are `PUT {api}/{pathname}` with the object bytes as the body;
/// lookups are `GET {api}?url={pathname}`.
#[derive(Clone)]
pub struct HttpBlobStore {
    client: Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for HttpBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBlobStore")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    url: String,
    pathname: String,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorEnvelope {
    #[serde(default)]
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpBlobStore {
    /// Create a store client for `api_url` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the URL does not parse or the token is
    /// empty.
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        request_timeout: Duration,
    ) -> RehostResult<Self> {
        let api_url = api_url.into();
        let token = token.into();

        url::Url::parse(&api_url).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "object store api_url {}: {}",
                api_url, e
            )))
        })?;
        if token.trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "object store token is empty".to_string(),
            ))
            .into());
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::InvalidConfig(format!(
                    "failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn failure(response: reqwest::Response, path: &str) -> StorageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let kind = classify_failure(status, &body, path);
        warn!(status = %status, path, kind = %kind, "Object store returned error");
        StorageError::new(kind)
    }
}

/// Map a failed response onto a storage error kind.
///
/// Conflicts are recognized by status 409 or a structured error code first;
/// the message text is consulted only when neither is present.
fn classify_failure(status: StatusCode, body: &str, path: &str) -> StorageErrorKind {
    let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let code = envelope.error.code.unwrap_or_default();
    let message = envelope
        .error
        .message
        .unwrap_or_else(|| body.chars().take(200).collect());
    let detail = format!("{} {}: {}", status.as_u16(), path, message);

    if status == StatusCode::CONFLICT || CONFLICT_CODES.contains(&code.as_str()) {
        return StorageErrorKind::AlreadyExists(detail);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return StorageErrorKind::Unavailable(detail);
    }
    if status == StatusCode::NOT_FOUND {
        return StorageErrorKind::NotFound(detail);
    }
    if message.to_ascii_lowercase().contains("already exists") {
        return StorageErrorKind::AlreadyExists(detail);
    }
    if status.is_client_error() {
        return StorageErrorKind::Rejected(detail);
    }
    StorageErrorKind::InvalidResponse(detail)
}

fn transport_error(e: reqwest::Error, path: &str) -> StorageError {
    StorageError::new(StorageErrorKind::Unavailable(format!("{}: {}", path, e)))
}

fn parse_error(e: reqwest::Error, path: &str) -> StorageError {
    StorageError::new(StorageErrorKind::InvalidResponse(format!("{}: {}", path, e)))
}

#[async_trait::async_trait]
impl ObjectStore for HttpBlobStore {
    fn backend(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        options: PutOptions,
    ) -> RehostResult<StoredObject> {
        let response = self
            .client
            .put(self.object_url(path))
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .header("x-content-type", content_type)
            .header(
                "x-add-random-suffix",
                if options.add_random_suffix { "1" } else { "0" },
            )
            .header("x-allow-overwrite", if options.overwrite { "1" } else { "0" })
            .body(data)
            .send()
            .await
            .map_err(|e| transport_error(e, path))?;

        if !response.status().is_success() {
            return Err(Self::failure(response, path).await.into());
        }

        let blob: BlobResponse = response.json().await.map_err(|e| parse_error(e, path))?;
        debug!(url = %blob.url, "Uploaded object");
        Ok(StoredObject {
            url: blob.url,
            pathname: blob.pathname,
        })
    }

    #[instrument(skip(self))]
    async fn head(&self, path: &str) -> RehostResult<Option<StoredObject>> {
        let response = self
            .client
            .get(&self.api_url)
            .bearer_auth(&self.token)
            .header("x-api-version", API_VERSION)
            .query(&[("url", path)])
            .send()
            .await
            .map_err(|e| transport_error(e, path))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No object at path");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::failure(response, path).await.into());
        }

        let blob: BlobResponse = response.json().await.map_err(|e| parse_error(e, path))?;
        Ok(Some(StoredObject {
            url: blob.url,
            pathname: blob.pathname,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(status: u16, body: &str) -> StorageErrorKind {
        classify_failure(StatusCode::from_u16(status).unwrap(), body, "assets/a.jpg")
    }

    #[test]
    fn conflict_status_and_codes() {
        assert!(matches!(kind(409, ""), StorageErrorKind::AlreadyExists(_)));
        assert!(matches!(
            kind(400, r#"{"error":{"code":"blob_already_exists"}}"#),
            StorageErrorKind::AlreadyExists(_)
        ));
        assert!(matches!(
            kind(403, r#"{"error":{"code":"already_exists","message":"nope"}}"#),
            StorageErrorKind::AlreadyExists(_)
        ));
    }

    #[test]
    fn message_is_only_a_fallback() {
        assert!(matches!(
            kind(400, r#"{"error":{"code":"bad_request","message":"This blob already exists"}}"#),
            StorageErrorKind::AlreadyExists(_)
        ));
        assert!(matches!(
            kind(503, r#"{"error":{"message":"already exists somewhere"}}"#),
            StorageErrorKind::Unavailable(_)
        ));
    }

    #[test]
    fn status_classes() {
        assert!(matches!(kind(429, ""), StorageErrorKind::Unavailable(_)));
        assert!(matches!(kind(502, "<html>"), StorageErrorKind::Unavailable(_)));
        assert!(matches!(kind(401, "{}"), StorageErrorKind::Rejected(_)));
        assert!(matches!(kind(404, ""), StorageErrorKind::NotFound(_)));
        assert!(matches!(kind(304, ""), StorageErrorKind::InvalidResponse(_)));
    }

    #[test]
    fn rejects_bad_config() {
        assert!(HttpBlobStore::new("not a url", "t", Duration::from_secs(1)).is_err());
        assert!(HttpBlobStore::new("https://blob.example", " ", Duration::from_secs(1)).is_err());
    }
}
