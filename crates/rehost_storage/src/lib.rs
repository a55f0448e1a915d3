//! Content-addressed object storage for the rehost media cache.
//!
//! The cache only needs two operations from a store: `put` an object at a
//! path and `head` a path to learn its public URL. Paths are derived from the
//! payload digest, so every backend gets deduplication for free.
//!
//! # Backends
//!
//! - [`HttpBlobStore`]: Vercel-Blob-compatible HTTP API
//! - [`FileSystemStore`]: local directory served from a public base URL
//!
//! # Example
//!
//! ```rust,no_run
//! use rehost_storage::{FileSystemStore, ObjectStore, PutOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileSystemStore::new("/tmp/media", "http://localhost:8080/media")?;
//! let object = store
//!     .put("assets/ab12.jpg", vec![0u8; 16].into(), "image/jpeg", PutOptions::default())
//!     .await?;
//! assert_eq!(object.url, "http://localhost:8080/media/assets/ab12.jpg");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod filesystem;
mod http;
mod object;

pub use config::{StoreBackend, StoreConfig};
pub use filesystem::FileSystemStore;
pub use http::HttpBlobStore;
pub use object::{ObjectStore, PutOptions, StoredObject};
pub use rehost_error::{StorageError, StorageErrorKind};
