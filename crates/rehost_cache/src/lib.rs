//! The rehost media cache.
//!
//! [`MediaCache::resolve`] turns a vendor image URL into a durable public
//! URL:
//!
//! 1. canonicalize the URL (query and fragment dropped)
//! 2. look it up in the mapping store; a hit returns with no network traffic
//! 3. download with [`HttpFetcher`], inspect, and upload to a
//!    content-addressed path with [`ObjectStoreClient`]
//! 4. record the mapping and return the public URL
//!
//! # Example
//!
//! ```rust,no_run
//! use rehost_cache::{CacheConfig, HttpFetcher, MediaCache, VendorConfig};
//! use rehost_core::MemoryMappingStore;
//! use rehost_storage::FileSystemStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::default();
//! let fetcher = HttpFetcher::new(&VendorConfig::default(), config.retry.clone())?;
//! let store = FileSystemStore::new("/tmp/media", "http://localhost:8080/media")?;
//! let cache = MediaCache::new(
//!     config,
//!     Arc::new(MemoryMappingStore::new()),
//!     fetcher,
//!     Arc::new(store),
//! );
//!
//! let url = cache
//!     .resolve("https://cdn.rescuegroups.org/p/1.jpg?width=300", "42")
//!     .await?;
//! println!("{}", url);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod fetcher;
mod upload;

pub use cache::{MediaCache, Resolution, ResolveOutcome};
pub use config::{CacheConfig, VendorConfig};
pub use fetcher::{FetchedPayload, HttpFetcher};
pub use upload::ObjectStoreClient;
