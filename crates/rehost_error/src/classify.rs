//! Failure classification consumed by the retry loops.

/// How a failed operation should be treated by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FailureClass {
    /// The resource is gone; retrying now or later will not help.
    #[display("permanent")]
    Permanent,
    /// The failure is expected to clear up within seconds; retry with backoff.
    #[display("retryable")]
    Retryable,
    /// Hard failure for this call, but a later pass may succeed.
    #[display("transient")]
    Transient,
}

/// Trait for errors that carry an explicit failure classification.
///
/// Retry loops inspect [`Classify::failure_class`] instead of matching on
/// error messages.
///
/// # Examples
///
/// ```
/// use rehost_error::{Classify, FailureClass, FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::Status {
///     status: 503,
///     url: "https://vendor.example/a.jpg".to_string(),
/// });
///
/// assert_eq!(err.failure_class(), FailureClass::Retryable);
/// assert!(err.is_retryable());
/// ```
pub trait Classify {
    /// Classification of this failure.
    fn failure_class(&self) -> FailureClass;

    /// Returns true if this error should trigger another attempt.
    fn is_retryable(&self) -> bool {
        self.failure_class() == FailureClass::Retryable
    }

    /// Returns true if the failure is terminal for the resource.
    fn is_permanent(&self) -> bool {
        self.failure_class() == FailureClass::Permanent
    }
}
