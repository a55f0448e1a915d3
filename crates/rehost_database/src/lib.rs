//! PostgreSQL mapping store for the rehost media cache.
//!
//! Maps `(source, original_url)` to the mirrored asset in the
//! `media_assets` table. Writes are idempotent upserts; the payload column is
//! always NULL because the object store holds the bytes.
//!
//! # Example
//!
//! ```rust,no_run
//! use rehost_database::{PostgresMappingStore, establish_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = establish_pool("postgres://localhost/rehost", 4)?;
//! run_migrations(&pool).await?;
//! let store = PostgresMappingStore::new(pool);
//! # Ok(())
//! # }
//! ```

mod connection;
mod models;
mod store;

pub mod schema;

pub use connection::{PgPool, establish_pool, run_migrations};
pub use models::{MediaAssetRow, NewMediaAssetRow};
pub use store::PostgresMappingStore;
