//! Top-level error wrapper types.

use crate::{
    Classify, ConfigError, DatabaseError, FailureClass, FetchError, FetchErrorKind, IoError,
    JsonError, StorageError,
};

/// Every failure the rehost workspace can surface.
///
/// # Examples
///
/// ```
/// use rehost_error::{RehostErrorKind, ConfigError};
///
/// let kind: RehostErrorKind = ConfigError::new("missing token").into();
/// assert!(format!("{}", kind).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum RehostErrorKind {
    /// Vendor download error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Object storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Mapping store error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Local file error
    #[from(IoError)]
    Io(IoError),
}

/// Rehost error with kind discrimination.
///
/// # Examples
///
/// ```
/// use rehost_error::{FetchError, FetchErrorKind, RehostError, RehostResult};
///
/// fn download() -> RehostResult<Vec<u8>> {
///     Err(FetchError::new(FetchErrorKind::NotFound("https://vendor.example/a.jpg".into())))?
/// }
///
/// let err = download().unwrap_err();
/// assert!(err.is_source_gone());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Rehost Error: {}", _0)]
pub struct RehostError(Box<RehostErrorKind>);

impl RehostError {
    /// Create a new error from a kind.
    pub fn new(kind: RehostErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RehostErrorKind {
        &self.0
    }

    /// True when the vendor confirmed the source asset no longer exists.
    pub fn is_source_gone(&self) -> bool {
        matches!(
            self.kind(),
            RehostErrorKind::Fetch(FetchError {
                kind: FetchErrorKind::NotFound(_),
                ..
            })
        )
    }

    /// True when the object store reported a write conflict at the path.
    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind(), RehostErrorKind::Storage(e) if e.is_already_exists())
    }

    /// Short message without source location, suitable for embedding in
    /// output records.
    pub fn diagnostic(&self) -> String {
        match self.kind() {
            RehostErrorKind::Fetch(e) => e.diagnostic(),
            RehostErrorKind::Storage(e) => e.diagnostic(),
            RehostErrorKind::Database(e) => e.diagnostic(),
            RehostErrorKind::Config(e) => e.message.clone(),
            RehostErrorKind::Json(e) => e.message.clone(),
            RehostErrorKind::Io(e) => e.message.clone(),
        }
    }
}

impl Classify for RehostError {
    fn failure_class(&self) -> FailureClass {
        match self.kind() {
            RehostErrorKind::Fetch(e) => e.failure_class(),
            RehostErrorKind::Storage(e) => e.failure_class(),
            RehostErrorKind::Database(e) => e.failure_class(),
            RehostErrorKind::Config(_) | RehostErrorKind::Json(_) | RehostErrorKind::Io(_) => {
                FailureClass::Transient
            }
        }
    }
}

// Generic From implementation for any type that converts to RehostErrorKind
impl<T> From<T> for RehostError
where
    T: Into<RehostErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for rehost operations.
pub type RehostResult<T> = std::result::Result<T, RehostError>;
