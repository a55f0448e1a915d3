//! Core domain types for the rehost media cache.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - **URL canonicalization**: resize-parameterized duplicates collapse to one key
//! - **Content inspection**: SHA-256, extension inference, pixel dimensions
//! - **Mapping store abstraction**: `(source, canonical URL) → mirrored asset`
//! - **Batch records**: JSONL records and their embedded photo references
//!
//! # Example
//!
//! ```rust
//! use rehost_core::{canonicalize_url, inspect, storage_path};
//!
//! let key = canonicalize_url("https://cdn.vendor.example/p/1.jpg?width=300");
//! assert_eq!(key, "https://cdn.vendor.example/p/1.jpg");
//!
//! let info = inspect(Some("text/plain"), b"not an image");
//! assert_eq!(info.extension, "bin");
//! assert_eq!(info.width, None);
//! assert_eq!(info.storage_path("assets"), storage_path("assets", &info.sha256, "bin"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod inspect;
mod mapping;
mod record;
mod source_url;

pub use inspect::{
    ContentInfo, FALLBACK_CONTENT_TYPE, FALLBACK_EXTENSION, dimensions, infer_extension, inspect,
    normalize_content_type, sha256_hex, storage_path,
};
pub use mapping::{
    EntityLink, MappingHit, MappingKey, MappingStore, MediaAssetRecord, MemoryMappingStore,
};
pub use record::{
    MAX_DIAGNOSTIC_CHARS, PhotoEntry, PhotoReference, Photos, Record, UNKNOWN_ENTITY_ID,
    truncate_chars,
};
pub use source_url::{canonicalize_url, host_of, is_mirrored_url, is_vendor_url};
