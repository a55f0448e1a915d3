//! Errors raised while assembling a run: configuration layers and the
//! credentials taken from the environment.
//!
//! These are always fatal and surface before any network or file I/O.

/// A configuration layer failed to load, or a required secret is absent.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What was wrong and, where possible, how to fix it
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Configuration error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// A required environment variable is unset or empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use rehost_error::ConfigError;
    ///
    /// let err = ConfigError::missing_var("BLOB_READ_WRITE_TOKEN");
    /// assert!(err.message.starts_with("BLOB_READ_WRITE_TOKEN not set"));
    /// ```
    #[track_caller]
    pub fn missing_var(name: &str) -> Self {
        Self::new(format!(
            "{} not set. Export it or add it to .env.local",
            name
        ))
    }
}
