//! Batch file (JSONL) encoding errors.

/// A record line that would not parse, or a record that would not encode.
///
/// Unlike per-photo failures these abort a batch run: skipping a line
/// would shift every later record and break resume.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// Parser message, prefixed with the input line when known
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// JSON error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Input line `line_number` (1-based) is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use rehost_error::JsonError;
    ///
    /// let err = JsonError::input_line(7, "expected value at column 1");
    /// assert_eq!(err.message, "input line 7: expected value at column 1");
    /// ```
    #[track_caller]
    pub fn input_line(line_number: usize, detail: impl std::fmt::Display) -> Self {
        Self::new(format!("input line {}: {}", line_number, detail))
    }
}
