//! Testing scope for thinker bodies.
//!
//! [`ScriptedScope`] lets a body be unit-tested without the runtime:
//! the test scripts how many polls succeed before the scope reports a
//! stop, and observes how often the body published.
//!
//! # Example
//!
//! ```
//! use mull_thinker::testing::ScriptedScope;
//! use mull_thinker::{ThinkResult, ThinkScope};
//!
//! fn body(scope: &dyn ThinkScope) -> ThinkResult {
//!     loop {
//!         scope.publish();
//!         scope.poll_for_stop()?;
//!     }
//! }
//!
//! let scope = ScriptedScope::stop_after(5);
//! assert!(body(&scope).is_err());
//! assert_eq!(scope.publish_count(), 6);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::signal::{Interrupt, ThinkResult};
use crate::traits::ThinkScope;

/// A [`ThinkScope`] with scripted poll outcomes.
///
/// Deterministic and synchronous: no threads, no runtime.
pub struct ScriptedScope {
    /// Polls answered `Ok` before the scope starts reporting a stop.
    allow_polls: usize,
    polls: AtomicUsize,
    publishes: AtomicUsize,
}

impl ScriptedScope {
    /// A scope that never requests a stop.
    #[must_use]
    pub fn never_stopping() -> Self {
        Self::stop_after(usize::MAX)
    }

    /// A scope whose first `n` polls succeed; every later poll reports
    /// a stop.
    #[must_use]
    pub fn stop_after(n: usize) -> Self {
        Self {
            allow_polls: n,
            polls: AtomicUsize::new(0),
            publishes: AtomicUsize::new(0),
        }
    }

    /// Number of polls the body has made.
    #[must_use]
    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::Relaxed)
    }

    /// Number of publishes the body has made.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::Relaxed)
    }
}

impl ThinkScope for ScriptedScope {
    fn poll_for_stop(&self) -> ThinkResult {
        let seen = self.polls.fetch_add(1, Ordering::Relaxed);
        if seen >= self.allow_polls {
            return Err(Interrupt);
        }
        Ok(())
    }

    fn publish(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_stopping_always_continues() {
        let scope = ScriptedScope::never_stopping();
        for _ in 0..100 {
            assert!(scope.poll_for_stop().is_ok());
        }
    }

    #[test]
    fn stops_after_allowed_polls() {
        let scope = ScriptedScope::stop_after(2);
        assert!(scope.poll_for_stop().is_ok());
        assert!(scope.poll_for_stop().is_ok());
        assert!(scope.poll_for_stop().is_err());
        assert!(scope.poll_for_stop().is_err());
        assert_eq!(scope.poll_count(), 4);
    }

    #[test]
    fn counts_publishes() {
        let scope = ScriptedScope::never_stopping();
        scope.publish();
        scope.publish();
        assert_eq!(scope.publish_count(), 2);
    }
}
