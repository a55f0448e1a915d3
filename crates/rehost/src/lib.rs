//! Rehost: mirror vendor-hosted images into durable object storage.
//!
//! This crate ties the workspace together:
//!
//! - [`RehostConfig`]: layered TOML + environment configuration
//! - [`Credentials`]: secrets checked before any I/O
//! - [`BatchRehoster`]: resumable JSONL pass rewriting vendor photo URLs
//! - [`Repairer`]: second pass over failures, marking vanished sources missing
//!
//! # Example
//!
//! ```rust,no_run
//! use rehost::{BatchOptions, BatchRehoster, Credentials, RehostConfig, build_cache};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RehostConfig::load(None)?;
//! let credentials = Credentials::from_env(&config, false)?;
//! let cache = build_cache(&config, &credentials)?;
//!
//! let summary = BatchRehoster::from_config(cache, &config)
//!     .run(&BatchOptions {
//!         input: "data/animals.jsonl".into(),
//!         output: "data/animals.rehosted.jsonl".into(),
//!         limit: 0,
//!         concurrency: config.batch.concurrency,
//!         resume: true,
//!         progress_every: config.batch.progress_every,
//!     })
//!     .await?;
//! println!("{}", summary);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod batch;
mod config;
mod credentials;
mod jsonl;
mod photo;
mod repair;

pub use app::build_cache;
pub use batch::{BatchOptions, BatchRehoster, BatchSummary};
pub use config::{BatchDefaults, DatabaseConfig, ENV_PREFIX, RehostConfig};
pub use credentials::{BLOB_TOKEN_VAR, Credentials, DATABASE_URL_VAR, database_url_from_env};
pub use jsonl::{RecordReader, RecordWriter, truncate_to_complete_records};
pub use photo::PhotoFilter;
pub use repair::{RepairOptions, RepairSummary, Repairer};

// Re-export the pieces callers need to assemble a cache by hand
pub use rehost_cache::{CacheConfig, MediaCache, Resolution, ResolveOutcome, VendorConfig};
pub use rehost_error::{RehostError, RehostResult};
pub use rehost_storage::{StoreBackend, StoreConfig};
