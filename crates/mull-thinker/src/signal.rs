//! Control-signal types for cooperative stop and change notification.
//!
//! Cancellation in mull is cooperative: the engine never unwinds a
//! worker preemptively. Instead, [`ThinkScope::poll_for_stop`]
//! (`crate::ThinkScope::poll_for_stop`) returns [`Interrupt`] once a
//! cancel has been requested, and the body propagates it with `?`. The
//! runner consumes the signal exactly once at its boundary; it never
//! reaches the controller as an error.
//!
//! # Why a Result, not an unwind?
//!
//! An exception-like unwind is an implementation choice, not a
//! contract. The contract is only that no user-body frames remain on
//! the worker stack when the runner writes its terminal state, and
//! `Result` + `?` gives exactly that with the propagation visible in
//! the body's source.

use serde::{Deserialize, Serialize};

/// Cooperative-stop signal raised through `poll_for_stop`.
///
/// Bodies treat this as opaque: receive it from the scope, propagate it
/// with `?`. Constructing one manually and returning it early is
/// allowed but is reported by the runner as a canceled completion with
/// a diagnostic, since no stop was requested.
///
/// # Example
///
/// ```
/// use mull_thinker::{Interrupt, ThinkResult};
///
/// fn step(stop_requested: bool) -> ThinkResult {
///     if stop_requested {
///         return Err(Interrupt);
///     }
///     Ok(())
/// }
///
/// assert!(step(false).is_ok());
/// assert!(step(true).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interrupt;

impl std::fmt::Display for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cooperative stop requested")
    }
}

impl std::error::Error for Interrupt {}

/// Result of a thinker body or of a single poll.
///
/// `Ok(())` means keep going (or natural completion when returned from
/// [`Think::think`](crate::Think::think)); `Err(Interrupt)` unwinds the
/// body to the runner boundary.
pub type ThinkResult = Result<(), Interrupt>;

/// Observer capability for "this thinker's output changed".
///
/// The runtime hands each watcher a throttled implementation of this
/// trait; the engine cell only knows how to fan a notification out to
/// whatever is attached. Implementations must tolerate being notified
/// from any worker thread.
pub trait ChangeNotifier: Send + Sync {
    /// Signals that the thinker finished a write window on its
    /// observable output.
    fn notify(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_propagates_with_question_mark() {
        fn body(polls_before_stop: usize) -> ThinkResult {
            for i in 0.. {
                let poll: ThinkResult = if i >= polls_before_stop {
                    Err(Interrupt)
                } else {
                    Ok(())
                };
                poll?;
            }
            Ok(())
        }

        assert_eq!(body(3), Err(Interrupt));
    }

    #[test]
    fn interrupt_display() {
        assert_eq!(Interrupt.to_string(), "cooperative stop requested");
    }

    #[test]
    fn notifier_is_object_safe() {
        struct Counter(std::sync::atomic::AtomicUsize);
        impl ChangeNotifier for Counter {
            fn notify(&self) {
                self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        }

        let counter = Counter(std::sync::atomic::AtomicUsize::new(0));
        let notifier: &dyn ChangeNotifier = &counter;
        notifier.notify();
        notifier.notify();
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::Relaxed), 2);
    }
}
