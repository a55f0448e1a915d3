//! PostgreSQL-backed mapping store.

use crate::schema::media_assets;
use crate::{MediaAssetRow, NewMediaAssetRow, PgPool};
use diesel::prelude::*;
use rehost_core::{MappingHit, MappingKey, MappingStore, MediaAssetRecord};
use rehost_error::{DatabaseError, DatabaseErrorKind, RehostResult};
use tracing::{debug, instrument};

/// Mapping store over the `media_assets` table.
///
/// Every call checks a connection out of the r2d2 pool on the blocking
/// thread pool, so the async runtime never waits on libpq.
#[derive(Debug, Clone)]
pub struct PostgresMappingStore {
    pool: PgPool,
}

impl PostgresMappingStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full row for a key, if one exists.
    #[instrument(skip(self))]
    pub async fn get(&self, key: MappingKey<'_>) -> RehostResult<Option<MediaAssetRow>> {
        let pool = self.pool.clone();
        let source = key.source.to_string();
        let original_url = key.original_url.to_string();

        tokio::task::spawn_blocking(move || -> RehostResult<Option<MediaAssetRow>> {
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            let row = media_assets::table
                .filter(media_assets::source.eq(&source))
                .filter(media_assets::original_url.eq(&original_url))
                .select(MediaAssetRow::as_select())
                .first(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(row)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?
    }
}

#[async_trait::async_trait]
impl MappingStore for PostgresMappingStore {
    #[instrument(skip(self))]
    async fn lookup(&self, key: MappingKey<'_>) -> RehostResult<Option<MappingHit>> {
        let pool = self.pool.clone();
        let source = key.source.to_string();
        let original_url = key.original_url.to_string();

        let found = tokio::task::spawn_blocking(move || -> RehostResult<Option<(String, String)>> {
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            let found = media_assets::table
                .filter(media_assets::source.eq(&source))
                .filter(media_assets::original_url.eq(&original_url))
                .select((media_assets::public_url, media_assets::sha256))
                .first::<(String, String)>(&mut conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(found)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))??;

        Ok(found.and_then(|(public_url, sha256)| {
            if public_url.is_empty() {
                debug!("Mapping row exists without a public URL");
                None
            } else {
                Some(MappingHit { public_url, sha256 })
            }
        }))
    }

    #[instrument(skip(self, record), fields(source = %record.source, url = %record.original_url))]
    async fn upsert(&self, record: &MediaAssetRecord) -> RehostResult<()> {
        let pool = self.pool.clone();
        let record = record.clone();

        tokio::task::spawn_blocking(move || -> RehostResult<()> {
            let mut conn = pool.get().map_err(DatabaseError::from)?;

            diesel::insert_into(media_assets::table)
                .values(NewMediaAssetRow::from(&record))
                .on_conflict((media_assets::source, media_assets::original_url))
                .do_update()
                .set((
                    media_assets::public_url.eq(&record.public_url),
                    media_assets::sha256.eq(&record.sha256),
                    media_assets::content_type.eq(&record.content_type),
                    media_assets::bytes.eq(record.size_bytes),
                    media_assets::width.eq(record.width),
                    media_assets::height.eq(record.height),
                    media_assets::file_ext.eq(&record.file_ext),
                    media_assets::data.eq(None::<Vec<u8>>),
                    media_assets::updated_at.eq(diesel::dsl::now),
                    media_assets::fetched_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)
                .map_err(DatabaseError::from)?;

            debug!("Upserted mapping row");
            Ok(())
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?
    }
}
