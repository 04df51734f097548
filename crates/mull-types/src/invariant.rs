//! Fatal invariant checks at labeled source locations.
//!
//! The engine promises a closed set of state transitions and a strict
//! threading discipline. Breaking either is a bug in the caller, not a
//! runtime condition, so violations are fatal: [`invariant!`] logs the
//! failure through `tracing` and panics with the violating call site.
//!
//! # When to use
//!
//! | Situation | Mechanism |
//! |-----------|-----------|
//! | Illegal state transition | `invariant!` |
//! | Controller-only op on a worker thread | `invariant!` |
//! | Double insertion into a registry | `invariant!` |
//! | Watcher attached to a reaped thinker | `ThinkerError` (recoverable) |
//!
//! # Example
//!
//! ```should_panic
//! use mull_types::invariant;
//!
//! let registered = false;
//! invariant!(registered, "runner must be registered before dispatch");
//! ```

/// Checks a condition that can only be false through caller error.
///
/// On failure, logs via `tracing::error!` and panics. The panic message
/// carries the source location of the `invariant!` call, so failures in
/// multi-threaded tests point at the violated contract rather than at
/// engine internals.
#[macro_export]
macro_rules! invariant {
    ($cond:expr) => {
        if !$cond {
            $crate::invariant_failed(stringify!($cond), "");
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::invariant_failed(stringify!($cond), &format!($($arg)+));
        }
    };
}

/// Reports a violated invariant and aborts the calling thread.
///
/// Not called directly; use [`invariant!`]. `#[track_caller]` makes the
/// recorded location the macro invocation site.
#[track_caller]
#[cold]
pub fn invariant_failed(condition: &str, detail: &str) -> ! {
    let location = std::panic::Location::caller();
    if detail.is_empty() {
        tracing::error!(%location, condition, "invariant violated");
        panic!("invariant violated at {location}: {condition}");
    }
    tracing::error!(%location, condition, "invariant violated: {detail}");
    panic!("invariant violated at {location}: {detail} ({condition})");
}

#[cfg(test)]
mod tests {
    #[test]
    fn passing_invariant_is_silent() {
        invariant!(1 + 1 == 2);
        invariant!(true, "with message {}", 42);
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn failing_invariant_panics() {
        invariant!(false);
    }

    #[test]
    #[should_panic(expected = "expected runner in Thinking")]
    fn failure_message_carries_detail() {
        invariant!(false, "expected runner in Thinking, found Paused");
    }

    #[test]
    fn panic_message_names_the_call_site() {
        let err = std::panic::catch_unwind(|| {
            invariant!(false, "boom");
        })
        .expect_err("must panic");
        let msg = err
            .downcast_ref::<String>()
            .expect("panic payload is a String");
        assert!(msg.contains(file!()));
    }
}
