//! Object storage error types.

use crate::{Classify, FailureClass};

/// Kinds of object storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Another writer already created the object at this path
    #[display("Object already exists: {}", _0)]
    AlreadyExists(String),
    /// No object at the specified path
    #[display("Object not found: {}", _0)]
    NotFound(String),
    /// Store is unreachable or overloaded (transport failure, 429, 5xx)
    #[display("Storage unavailable: {}", _0)]
    Unavailable(String),
    /// Store refused the request (auth, validation)
    #[display("Request rejected: {}", _0)]
    Rejected(String),
    /// Store answered with a body we could not understand
    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
    /// Failed to create storage directory
    #[display("Failed to create storage directory: {}", _0)]
    DirectoryCreation(String),
    /// Failed to write file
    #[display("Failed to write file: {}", _0)]
    FileWrite(String),
    /// Invalid storage path
    #[display("Invalid storage path: {}", _0)]
    InvalidPath(String),
    /// Invalid storage configuration
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
}

impl StorageErrorKind {
    /// Classification used by the upload retry loop.
    ///
    /// `AlreadyExists` is retryable so the loop keeps going when the `head`
    /// reconciliation does not produce a URL.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            StorageErrorKind::AlreadyExists(_)
            | StorageErrorKind::Unavailable(_)
            | StorageErrorKind::FileWrite(_) => FailureClass::Retryable,
            StorageErrorKind::NotFound(_) => FailureClass::Permanent,
            StorageErrorKind::Rejected(_)
            | StorageErrorKind::InvalidResponse(_)
            | StorageErrorKind::DirectoryCreation(_)
            | StorageErrorKind::InvalidPath(_)
            | StorageErrorKind::InvalidConfig(_) => FailureClass::Transient,
        }
    }
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use rehost_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("assets/ab.jpg".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Returns true when the store reported a write conflict.
    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind, StorageErrorKind::AlreadyExists(_))
    }

    /// Short message without source location.
    pub fn diagnostic(&self) -> String {
        self.kind.to_string()
    }
}

impl Classify for StorageError {
    fn failure_class(&self) -> FailureClass {
        self.kind.failure_class()
    }
}
