//! Vendor download error types.

use crate::{Classify, FailureClass};

/// HTTP statuses that are worth another attempt after a backoff.
pub const RETRYABLE_HTTP_STATUS: [u16; 5] = [429, 500, 502, 503, 504];

/// Vendor download failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// Vendor answered 404; the asset is gone
    #[display("404_not_found:{}", _0)]
    NotFound(String),
    /// Vendor answered with a non-success status other than 404
    #[display("http_{}:{}", status, url)]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },
    /// Request timed out (connect or read)
    #[display("timeout:{}", _0)]
    Timeout(String),
    /// Connection could not be established or was reset
    #[display("connection:{}", _0)]
    Connection(String),
    /// Response body could not be read to completion
    #[display("body:{}", _0)]
    Body(String),
    /// HTTP client could not be constructed
    #[display("client:{}", _0)]
    Client(String),
}

impl FetchErrorKind {
    /// Classification used by the download retry loop.
    pub fn failure_class(&self) -> FailureClass {
        match self {
            FetchErrorKind::NotFound(_) => FailureClass::Permanent,
            FetchErrorKind::Status { status, .. } if RETRYABLE_HTTP_STATUS.contains(status) => {
                FailureClass::Retryable
            }
            FetchErrorKind::Status { .. } => FailureClass::Transient,
            FetchErrorKind::Timeout(_)
            | FetchErrorKind::Connection(_)
            | FetchErrorKind::Body(_) => FailureClass::Retryable,
            FetchErrorKind::Client(_) => FailureClass::Transient,
        }
    }
}

/// Download error with source location tracking.
///
/// # Examples
///
/// ```
/// use rehost_error::{Classify, FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::NotFound("https://vendor.example/a.jpg".into()));
/// assert!(err.is_permanent());
/// assert_eq!(err.diagnostic(), "404_not_found:https://vendor.example/a.jpg");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new FetchError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Short message without source location.
    pub fn diagnostic(&self) -> String {
        self.kind.to_string()
    }
}

impl Classify for FetchError {
    fn failure_class(&self) -> FailureClass {
        self.kind.failure_class()
    }
}
