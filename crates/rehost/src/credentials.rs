//! Secrets read from the environment at startup.

use crate::RehostConfig;
use rehost_error::{ConfigError, RehostResult};

/// Connection string for the mapping store.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Bearer token for the HTTP object store.
pub const BLOB_TOKEN_VAR: &str = "BLOB_READ_WRITE_TOKEN";

/// Credentials a run needs, checked before any file or network I/O.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// `None` only for dry runs
    pub database_url: Option<String>,
    /// `None` only when the store backend needs no token
    pub blob_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("blob_token", &self.blob_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first required variable that
    /// is unset or empty.
    pub fn from_env(config: &RehostConfig, dry_run: bool) -> RehostResult<Self> {
        Self::from_lookup(config, dry_run, |name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    ///
    /// `DATABASE_URL` is required unless `dry_run`; the blob token is
    /// required when the configured store backend asks for one.
    pub fn from_lookup<F>(config: &RehostConfig, dry_run: bool, lookup: F) -> RehostResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_url = if dry_run {
            None
        } else {
            Some(
                read(DATABASE_URL_VAR)
                    .ok_or_else(|| ConfigError::missing_var(DATABASE_URL_VAR))?,
            )
        };

        let blob_token = if config.store.requires_token() {
            Some(
                read(BLOB_TOKEN_VAR)
                    .ok_or_else(|| ConfigError::missing_var(BLOB_TOKEN_VAR))?,
            )
        } else {
            None
        };

        Ok(Self {
            database_url,
            blob_token,
        })
    }
}

/// `DATABASE_URL` alone, for commands that never touch the object store.
pub fn database_url_from_env() -> RehostResult<String> {
    std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::missing_var(DATABASE_URL_VAR).into())
}
