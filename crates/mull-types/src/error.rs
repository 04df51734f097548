//! Unified error interface for mull.
//!
//! Every recoverable error type in the workspace implements
//! [`ErrorCode`] so that callers, logs and monitoring all speak the
//! same vocabulary.
//!
//! # Design
//!
//! - **Machine-readable codes**: stable `UPPER_SNAKE_CASE` strings,
//!   prefixed per crate (`THINKER_`, `RUNTIME_`).
//! - **Recoverability info**: whether retrying the operation can ever
//!   succeed.
//!
//! Programming errors (illegal transitions, wrong-thread calls) do NOT
//! go through this trait — they are fatal and raised via
//! [`invariant!`](crate::invariant!).
//!
//! # Example
//!
//! ```
//! use mull_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum QueueError {
//!     Full,
//!     Closed,
//! }
//!
//! impl ErrorCode for QueueError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Full => "QUEUE_FULL",
//!             Self::Closed => "QUEUE_CLOSED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Full)
//!     }
//! }
//!
//! assert_eq!(QueueError::Full.code(), "QUEUE_FULL");
//! assert!(QueueError::Full.is_recoverable());
//! ```

/// Unified error code interface.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**: e.g. `"THINKER_REAPED"`
/// - **Crate-prefixed**: `"THINKER_"` for `mull-thinker`,
///   `"RUNTIME_"` for `mull-runtime`
/// - **Stable**: a code never changes once published (API contract)
///
/// # Recoverability
///
/// An error is recoverable when retrying may succeed or the caller can
/// take a corrective action: a full queue drains, a detached watcher
/// can be re-attached to a fresh thinker. It is not recoverable when
/// no retry will ever help: the referenced thinker has already been
/// reaped, the input was malformed.
pub trait ErrorCode {
    /// Returns the machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether retrying the failed operation may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that a single error's code is well-formed.
///
/// Checks the crate prefix and the `UPPER_SNAKE_CASE` format. Intended
/// for use inside `#[cfg(test)]` modules of error definitions.
///
/// # Panics
///
/// Panics when the code does not start with `expected_prefix` or is not
/// `UPPER_SNAKE_CASE`.
pub fn assert_error_code<E: ErrorCode>(error: &E, expected_prefix: &str) {
    let code = error.code();
    assert!(
        code.starts_with(expected_prefix),
        "error code {code:?} must start with prefix {expected_prefix:?}"
    );
    assert!(
        is_upper_snake_case(code),
        "error code {code:?} must be UPPER_SNAKE_CASE"
    );
}

/// Asserts that every error in a slice has a well-formed code.
///
/// Error modules list all their variants once and pass them here, so a
/// new variant with a malformed code fails the suite immediately.
///
/// # Example
///
/// ```
/// use mull_types::{assert_error_codes, ErrorCode};
///
/// #[derive(Debug)]
/// enum MyError { A, B }
///
/// impl ErrorCode for MyError {
///     fn code(&self) -> &'static str {
///         match self {
///             Self::A => "MY_A",
///             Self::B => "MY_B",
///         }
///     }
///     fn is_recoverable(&self) -> bool { false }
/// }
///
/// assert_error_codes(&[MyError::A, MyError::B], "MY_");
/// ```
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
