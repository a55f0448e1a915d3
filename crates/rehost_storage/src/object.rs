//! The object store seam and the values that cross it.

use bytes::Bytes;
use rehost_error::RehostResult;

/// Write flags sent with every upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutOptions {
    /// Replace an existing object at the same path
    pub overwrite: bool,
    /// Let the store append a random suffix to the path
    pub add_random_suffix: bool,
}

impl Default for PutOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            add_random_suffix: false,
        }
    }
}

/// An object as reported by the store after a write or a `head`.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", url)]
pub struct StoredObject {
    /// Durable public URL
    pub url: String,
    /// Path inside the store
    pub pathname: String,
}

/// Opaque put/head object storage.
///
/// Paths are content-addressed (`<prefix>/<sha256>.<ext>`), so writing the
/// same path twice always writes the same bytes.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Write `data` at `path` and return its public location.
    async fn put(
        &self,
        path: &str,
        data: Bytes,
        content_type: &str,
        options: PutOptions,
    ) -> RehostResult<StoredObject>;

    /// Look up an existing object. `Ok(None)` when nothing is stored at `path`.
    async fn head(&self, path: &str) -> RehostResult<Option<StoredObject>>;
}
