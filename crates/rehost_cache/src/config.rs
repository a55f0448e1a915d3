//! Vendor and cache configuration sections.

use rehost_retry::RetryConfig;
use serde::{Deserialize, Serialize};

/// `[vendor]` section: where images come from and how to ask for them.
///
/// # Example
///
/// ```toml
/// [vendor]
/// domain = "rescuegroups.org"
/// user_agent = "RehostImporter/1.0"
/// connect_timeout_seconds = 10
/// read_timeout_seconds = 90
/// entity_id_fields = ["sourceAnimalId", "m2mId"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Host suffix identifying vendor image URLs
    pub domain: String,
    /// `User-Agent` sent with every download
    pub user_agent: String,
    /// TCP connect timeout, in seconds
    pub connect_timeout_seconds: u64,
    /// Read timeout, in seconds
    pub read_timeout_seconds: u64,
    /// Record fields holding the entity id, in precedence order
    pub entity_id_fields: Vec<String>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            domain: "rescuegroups.org".to_string(),
            user_agent: "RehostImporter/1.0".to_string(),
            connect_timeout_seconds: 10,
            read_timeout_seconds: 90,
            entity_id_fields: vec!["sourceAnimalId".to_string(), "m2mId".to_string()],
        }
    }
}

/// Settings the cache orchestrator needs on every resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Vendor tag stored in the `source` column
    pub source: String,
    /// Entity kind stored in the `source_entity` column
    pub source_entity: String,
    /// Directory prefix for content-addressed object paths
    pub path_prefix: String,
    /// Attempt budgets and backoff
    pub retry: RetryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            source: "RG".to_string(),
            source_entity: "animal".to_string(),
            path_prefix: "assets".to_string(),
            retry: RetryConfig::default(),
        }
    }
}
