//! Object store selection and construction.

use crate::{FileSystemStore, HttpBlobStore, ObjectStore};
use rehost_error::{RehostResult, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Available object store backends.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    /// Vercel-Blob-compatible HTTP API
    #[default]
    Http,
    /// Local directory with a public base URL
    Filesystem,
}

/// `[store]` section of the configuration.
///
/// # Example
///
/// ```toml
/// [store]
/// backend = "http"
/// api_url = "https://blob.vercel-storage.com"
/// mirror_host = "blob.vercel-storage.com"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which backend to build
    pub backend: StoreBackend,
    /// Base URL of the HTTP object store API
    pub api_url: String,
    /// Host marker identifying URLs that already point at the mirror
    pub mirror_host: String,
    /// Per-request timeout for the HTTP backend, in seconds
    pub request_timeout_seconds: u64,
    /// Root directory for the filesystem backend
    pub root: PathBuf,
    /// Public base URL for the filesystem backend
    pub public_base_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Http,
            api_url: "https://blob.vercel-storage.com".to_string(),
            mirror_host: "blob.vercel-storage.com".to_string(),
            request_timeout_seconds: 120,
            root: PathBuf::from("rehost-media"),
            public_base_url: "http://localhost:8080/media".to_string(),
        }
    }
}

impl StoreConfig {
    /// True when this backend needs a bearer token.
    pub fn requires_token(&self) -> bool {
        self.backend == StoreBackend::Http
    }

    /// Build the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the HTTP backend is selected without a
    /// token, or when the backend itself rejects its settings.
    pub fn build(&self, token: Option<&str>) -> RehostResult<Arc<dyn ObjectStore>> {
        match self.backend {
            StoreBackend::Http => {
                let token = token.ok_or_else(|| {
                    StorageError::new(StorageErrorKind::InvalidConfig(
                        "the http object store requires a token".to_string(),
                    ))
                })?;
                Ok(Arc::new(HttpBlobStore::new(
                    &self.api_url,
                    token,
                    Duration::from_secs(self.request_timeout_seconds),
                )?))
            }
            StoreBackend::Filesystem => Ok(Arc::new(FileSystemStore::new(
                &self.root,
                &self.public_base_url,
            )?)),
        }
    }
}
