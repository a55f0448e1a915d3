//! The cache orchestrator.

use crate::{CacheConfig, HttpFetcher, ObjectStoreClient};
use rehost_core::{
    EntityLink, MappingHit, MappingKey, MappingStore, MediaAssetRecord, canonicalize_url, inspect,
};
use rehost_error::RehostResult;
use rehost_retry::retry_all;
use rehost_storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Which path a resolution took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The mapping store already knew the URL; nothing was fetched
    CacheHit {
        /// Digest recorded when the image was first mirrored
        sha256: String,
    },
    /// The image was downloaded and uploaded during this call
    Mirrored {
        /// Digest of the downloaded payload
        sha256: String,
        /// Object path the payload was written to
        path: String,
    },
}

/// Result of [`MediaCache::resolve_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical form of the requested URL
    pub canonical_url: String,
    /// Durable public URL of the mirrored image
    pub public_url: String,
    /// Cache hit or fresh mirror
    pub outcome: ResolveOutcome,
}

/// Mirrors vendor images into the object store exactly once per canonical
/// URL and remembers where they went.
///
/// The mapping store is advisory: lookup failures degrade to a miss and
/// upsert failures are logged, so a flaky database never blocks a rewrite.
#[derive(Clone)]
pub struct MediaCache {
    config: CacheConfig,
    mappings: Arc<dyn MappingStore>,
    fetcher: HttpFetcher,
    uploader: ObjectStoreClient,
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("config", &self.config)
            .field("uploader", &self.uploader)
            .finish_non_exhaustive()
    }
}

impl MediaCache {
    /// Assemble a cache from its collaborators.
    pub fn new(
        config: CacheConfig,
        mappings: Arc<dyn MappingStore>,
        fetcher: HttpFetcher,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let uploader = ObjectStoreClient::new(store, config.retry.clone());
        Self {
            config,
            mappings,
            fetcher,
            uploader,
        }
    }

    /// Configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the mirrored public URL for `source_url`, mirroring it first
    /// if needed.
    ///
    /// # Errors
    ///
    /// Download and upload failures are returned; check
    /// `RehostError::is_source_gone` for a vendor 404.
    pub async fn resolve(&self, source_url: &str, entity_id: &str) -> RehostResult<String> {
        self.resolve_detailed(source_url, entity_id, None)
            .await
            .map(|resolution| resolution.public_url)
    }

    /// Like [`resolve`](Self::resolve), reporting which path ran and
    /// recording the vendor media id when given.
    #[instrument(skip(self))]
    pub async fn resolve_detailed(
        &self,
        source_url: &str,
        entity_id: &str,
        media_id: Option<&str>,
    ) -> RehostResult<Resolution> {
        let canonical_url = canonicalize_url(source_url);
        let key = MappingKey {
            source: &self.config.source,
            original_url: &canonical_url,
        };

        if let Some(hit) = self.lookup(key).await {
            debug!(public_url = %hit.public_url, "Cache hit");
            return Ok(Resolution {
                canonical_url,
                public_url: hit.public_url,
                outcome: ResolveOutcome::CacheHit { sha256: hit.sha256 },
            });
        }

        let payload = self.fetcher.download(&canonical_url).await?;
        let info = inspect(payload.content_type.as_deref(), &payload.bytes);
        let path = info.storage_path(&self.config.path_prefix);

        let object = self
            .uploader
            .put_with_retries(&path, payload.bytes, info.content_type.as_deref())
            .await?;

        let entity = EntityLink::new(&self.config.source_entity, entity_id)
            .with_media_id(media_id.map(str::to_string));
        let record = MediaAssetRecord::from_content(key, &entity, &object.url, &info);
        self.record(&record).await;

        info!(url = %object.url, sha256 = %info.sha256, "Mirrored image");
        Ok(Resolution {
            canonical_url,
            public_url: object.url,
            outcome: ResolveOutcome::Mirrored {
                sha256: info.sha256,
                path,
            },
        })
    }

    async fn lookup(&self, key: MappingKey<'_>) -> Option<MappingHit> {
        let retry = &self.config.retry;
        match retry_all("lookup", retry.max_lookup_attempts, retry, || {
            self.mappings.lookup(key)
        })
        .await
        {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Mapping lookup failed, treating as miss");
                None
            }
        }
    }

    async fn record(&self, record: &MediaAssetRecord) {
        let retry = &self.config.retry;
        if let Err(e) = retry_all("upsert", retry.max_upsert_attempts, retry, || {
            self.mappings.upsert(record)
        })
        .await
        {
            warn!(error = %e, url = %record.original_url, "Mapping upsert failed, continuing");
        }
    }
}
