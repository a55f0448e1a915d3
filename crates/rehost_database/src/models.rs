//! Row types for the `media_assets` table.

use crate::schema::media_assets;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rehost_core::MediaAssetRecord;

/// Database row for the media_assets table.
///
/// The `data` column is never read; the object store holds the bytes.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = media_assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MediaAssetRow {
    pub id: i64,
    pub source: String,
    pub source_entity: String,
    pub source_entity_id: String,
    pub source_media_id: Option<String>,
    pub original_url: String,
    pub public_url: String,
    pub sha256: String,
    pub content_type: Option<String>,
    #[diesel(column_name = bytes)]
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_ext: String,
    pub fetched_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the media_assets table.
///
/// `data` is left out and defaults to NULL.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = media_assets)]
pub struct NewMediaAssetRow<'a> {
    pub source: &'a str,
    pub source_entity: &'a str,
    pub source_entity_id: &'a str,
    pub source_media_id: Option<&'a str>,
    pub original_url: &'a str,
    pub public_url: &'a str,
    pub sha256: &'a str,
    pub content_type: Option<&'a str>,
    #[diesel(column_name = bytes)]
    pub size_bytes: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub file_ext: &'a str,
}

impl<'a> From<&'a MediaAssetRecord> for NewMediaAssetRow<'a> {
    fn from(record: &'a MediaAssetRecord) -> Self {
        Self {
            source: &record.source,
            source_entity: &record.source_entity,
            source_entity_id: &record.source_entity_id,
            source_media_id: record.source_media_id.as_deref(),
            original_url: &record.original_url,
            public_url: &record.public_url,
            sha256: &record.sha256,
            content_type: record.content_type.as_deref(),
            size_bytes: record.size_bytes,
            width: record.width,
            height: record.height,
            file_ext: &record.file_ext,
        }
    }
}
