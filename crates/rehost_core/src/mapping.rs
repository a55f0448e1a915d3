//! Mapping store abstraction: canonical source URL → mirrored asset.

use crate::ContentInfo;
use rehost_error::RehostResult;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A cache hit: the asset was mirrored before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingHit {
    /// Durable public URL of the mirrored object (never empty)
    pub public_url: String,
    /// Digest of the payload that was mirrored
    pub sha256: String,
}

/// A full mapping row as written by the orchestrator.
///
/// Identity is `(source, original_url)`; the entity fields are linkage back to
/// the record that referenced the image and are not part of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAssetRecord {
    /// Vendor tag (e.g. `RG`)
    pub source: String,
    /// Kind of entity that referenced the image (e.g. `animal`)
    pub source_entity: String,
    /// Id of the entity that referenced the image
    pub source_entity_id: String,
    /// Vendor's own media id, when known
    pub source_media_id: Option<String>,
    /// Canonical source URL
    pub original_url: String,
    /// Mirrored public URL
    pub public_url: String,
    /// Lowercase hex SHA-256 of the payload
    pub sha256: String,
    /// Normalized MIME type
    pub content_type: Option<String>,
    /// Payload size in bytes
    pub size_bytes: i64,
    /// Pixel width
    pub width: Option<i32>,
    /// Pixel height
    pub height: Option<i32>,
    /// File extension used in the storage path
    pub file_ext: String,
}

impl MediaAssetRecord {
    /// Build a record from inspected content and its mirrored location.
    pub fn from_content(
        key: MappingKey<'_>,
        entity: &EntityLink,
        public_url: impl Into<String>,
        info: &ContentInfo,
    ) -> Self {
        Self {
            source: key.source.to_string(),
            source_entity: entity.kind.clone(),
            source_entity_id: entity.id.clone(),
            source_media_id: entity.media_id.clone(),
            original_url: key.original_url.to_string(),
            public_url: public_url.into(),
            sha256: info.sha256.clone(),
            content_type: info.content_type.clone(),
            size_bytes: info.size_bytes,
            width: info.width.and_then(|w| i32::try_from(w).ok()),
            height: info.height.and_then(|h| i32::try_from(h).ok()),
            file_ext: info.extension.to_string(),
        }
    }
}

/// Mapping key: vendor tag plus canonical URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingKey<'a> {
    /// Vendor tag
    pub source: &'a str,
    /// Canonical source URL
    pub original_url: &'a str,
}

/// Linkage from a mirrored asset back to the record that referenced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityLink {
    /// Entity kind (e.g. `animal`)
    pub kind: String,
    /// Entity id
    pub id: String,
    /// Vendor media id, when known
    pub media_id: Option<String>,
}

impl EntityLink {
    /// Link without a vendor media id.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            media_id: None,
        }
    }

    /// Attach a vendor media id.
    pub fn with_media_id(mut self, media_id: Option<String>) -> Self {
        self.media_id = media_id;
        self
    }
}

/// Durable key/value table backing the cache.
///
/// Both operations are advisory from the orchestrator's point of view: a
/// failing lookup is treated as a miss and a failing upsert only costs a
/// future re-fetch.
#[async_trait::async_trait]
pub trait MappingStore: Send + Sync {
    /// Return the mirrored location for a key, if a non-empty one exists.
    async fn lookup(&self, key: MappingKey<'_>) -> RehostResult<Option<MappingHit>>;

    /// Insert or replace the row for `(record.source, record.original_url)`.
    async fn upsert(&self, record: &MediaAssetRecord) -> RehostResult<()>;
}

/// In-process mapping store.
///
/// Used for dry runs and tests. Rows live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    rows: Mutex<HashMap<(String, String), MediaAssetRecord>>,
}

impl MemoryMappingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    /// True when no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }

    /// Fetch a full row by key.
    pub async fn get(&self, key: MappingKey<'_>) -> Option<MediaAssetRecord> {
        self.rows
            .lock()
            .await
            .get(&(key.source.to_string(), key.original_url.to_string()))
            .cloned()
    }

    /// Snapshot of all rows.
    pub async fn rows(&self) -> Vec<MediaAssetRecord> {
        self.rows.lock().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl MappingStore for MemoryMappingStore {
    async fn lookup(&self, key: MappingKey<'_>) -> RehostResult<Option<MappingHit>> {
        Ok(self.get(key).await.and_then(|row| {
            (!row.public_url.is_empty()).then(|| MappingHit {
                public_url: row.public_url,
                sha256: row.sha256,
            })
        }))
    }

    async fn upsert(&self, record: &MediaAssetRecord) -> RehostResult<()> {
        self.rows.lock().await.insert(
            (record.source.clone(), record.original_url.clone()),
            record.clone(),
        );
        Ok(())
    }
}
