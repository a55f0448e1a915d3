//! Uploads with retry and conflict reconciliation.

use bytes::Bytes;
use rehost_core::FALLBACK_CONTENT_TYPE;
use rehost_error::RehostResult;
use rehost_retry::{RetryConfig, retry_classified};
use rehost_storage::{ObjectStore, PutOptions, StoredObject};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Puts objects with overwrite enabled and resolves "already exists"
/// answers through `head`.
#[derive(Clone)]
pub struct ObjectStoreClient {
    store: Arc<dyn ObjectStore>,
    retry: RetryConfig,
}

impl std::fmt::Debug for ObjectStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreClient")
            .field("backend", &self.store.backend())
            .field("retry", &self.retry)
            .finish()
    }
}

impl ObjectStoreClient {
    /// Wrap a store with the upload retry budget from `retry`.
    pub fn new(store: Arc<dyn ObjectStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Upload `data` to `path`, retrying retryable failures.
    ///
    /// A conflict is answered with a `head` on the same path; when that
    /// yields the existing object its URL is returned, otherwise the conflict
    /// counts as a failed attempt.
    #[instrument(skip(self, data), fields(backend = self.store.backend(), size = data.len()))]
    pub async fn put_with_retries(
        &self,
        path: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> RehostResult<StoredObject> {
        let content_type = content_type.unwrap_or(FALLBACK_CONTENT_TYPE);

        retry_classified(
            "upload",
            self.retry.max_upload_attempts,
            &self.retry,
            || self.put_once(path, data.clone(), content_type),
        )
        .await
    }

    async fn put_once(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> RehostResult<StoredObject> {
        let err = match self
            .store
            .put(path, data, content_type, PutOptions::default())
            .await
        {
            Ok(object) => return Ok(object),
            Err(e) if e.is_already_exists() => e,
            Err(e) => return Err(e),
        };

        match self.store.head(path).await {
            Ok(Some(object)) => {
                info!(url = %object.url, "Object already stored, reusing it");
                Ok(object)
            }
            Ok(None) => {
                warn!("Store reported a conflict but head found nothing");
                Err(err)
            }
            Err(head_err) => {
                warn!(error = %head_err, "Head after conflict failed");
                Err(err)
            }
        }
    }
}
