//! Error types for the rehost media cache.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Leaf errors implement [`Classify`], which tells retry loops whether a
//! failure is [`FailureClass::Permanent`], [`FailureClass::Retryable`] or
//! [`FailureClass::Transient`].
//!
//! # Examples
//!
//! ```
//! use rehost_error::{Classify, RehostResult, StorageError, StorageErrorKind};
//!
//! fn upload() -> RehostResult<String> {
//!     Err(StorageError::new(StorageErrorKind::Unavailable("503".into())))?
//! }
//!
//! let err = upload().unwrap_err();
//! assert!(err.is_retryable());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod database;
mod error;
mod fetch;
mod io;
mod json;
mod storage;

pub use classify::{Classify, FailureClass};
pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{RehostError, RehostErrorKind, RehostResult};
pub use fetch::{FetchError, FetchErrorKind, RETRYABLE_HTTP_STATUS};
pub use io::IoError;
pub use json::JsonError;
pub use storage::{StorageError, StorageErrorKind};
