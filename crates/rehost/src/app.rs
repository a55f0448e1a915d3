//! Wiring the cache together from configuration and credentials.

use crate::{Credentials, RehostConfig};
use rehost_cache::{HttpFetcher, MediaCache};
use rehost_core::{MappingStore, MemoryMappingStore};
use rehost_database::{PostgresMappingStore, establish_pool};
use rehost_error::RehostResult;
use std::sync::Arc;
use tracing::info;

/// Build a [`MediaCache`] backed by Postgres, or by an in-memory mapping
/// store when `credentials` carry no database URL.
///
/// Nothing here touches the network; the pool connects lazily.
pub fn build_cache(config: &RehostConfig, credentials: &Credentials) -> RehostResult<MediaCache> {
    let mappings: Arc<dyn MappingStore> = match &credentials.database_url {
        Some(url) => {
            let pool = establish_pool(url, config.database.pool_size)?;
            Arc::new(PostgresMappingStore::new(pool))
        }
        None => {
            info!("Dry run: mappings are kept in memory");
            Arc::new(MemoryMappingStore::new())
        }
    };

    let store = config.store.build(credentials.blob_token.as_deref())?;
    let fetcher = HttpFetcher::new(&config.vendor, config.cache.retry.clone())?;

    info!(
        backend = store.backend(),
        source = %config.cache.source,
        "Media cache ready"
    );
    Ok(MediaCache::new(config.cache.clone(), mappings, fetcher, store))
}
