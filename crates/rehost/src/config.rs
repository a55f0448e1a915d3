//! Layered configuration for the rehost binary.

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use rehost_cache::{CacheConfig, VendorConfig};
use rehost_error::{ConfigError, RehostError, RehostResult};
use rehost_storage::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../rehost.toml");

/// Prefix for environment overrides, e.g. `REHOST__STORE__BACKEND=filesystem`.
pub const ENV_PREFIX: &str = "REHOST";

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maximum pooled connections
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { pool_size: 8 }
    }
}

/// `[batch]` section: defaults for flags the CLI leaves unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchDefaults {
    /// In-flight resolutions for `rehost photos`
    pub concurrency: usize,
    /// In-flight resolutions for `rehost repair`
    pub repair_concurrency: usize,
    /// Log counters every N records (0 disables)
    pub progress_every: usize,
}

impl Default for BatchDefaults {
    fn default() -> Self {
        Self {
            concurrency: 3,
            repair_concurrency: 6,
            progress_every: 200,
        }
    }
}

/// Complete rehost configuration.
///
/// Sources, lowest to highest precedence:
///
/// 1. Bundled `rehost.toml`
/// 2. `~/.config/rehost/rehost.toml`
/// 3. `./rehost.toml`
/// 4. The file passed with `--config`
/// 5. `REHOST__SECTION__KEY` environment variables
///
/// Every section is optional in every file; missing keys keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RehostConfig {
    /// Vendor download settings
    pub vendor: VendorConfig,
    /// Object store backend
    pub store: StoreConfig,
    /// Orchestrator settings and retry policy
    pub cache: CacheConfig,
    /// Batch driver defaults
    pub batch: BatchDefaults,
    /// Mapping store pool
    pub database: DatabaseConfig,
}

impl RehostConfig {
    /// Load configuration from every source, with `explicit` layered above
    /// the discovered files.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a file cannot be parsed, if the
    /// explicit file does not exist, or if a value has the wrong type.
    pub fn load(explicit: Option<&Path>) -> RehostResult<Self> {
        debug!("Loading configuration with precedence: env > --config > current dir > home dir > bundled defaults");

        let mut builder = bundled();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/rehost/rehost.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("rehost").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        finish(builder)
    }

    /// Bundled defaults overlaid with a single TOML document.
    pub fn from_toml_str(toml: &str) -> RehostResult<Self> {
        finish(bundled().add_source(File::from_str(toml, FileFormat::Toml)))
    }
}

fn bundled() -> ConfigBuilder<DefaultState> {
    Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
}

fn finish(builder: ConfigBuilder<DefaultState>) -> RehostResult<RehostConfig> {
    builder
        .build()
        .map_err(|e| {
            RehostError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            RehostError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_match_struct_defaults() {
        let config = RehostConfig::from_toml_str("").unwrap();
        assert_eq!(config, RehostConfig::default());
    }
}
