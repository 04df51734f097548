//! Core capability traits for thinker bodies.
//!
//! Two traits form the whole contract between a computation and the
//! engine:
//!
//! ```text
//! engine ──calls──► Think::think(&mut self, scope)
//!                        │
//!                        └──calls back──► ThinkScope::poll_for_stop()
//!                                         ThinkScope::publish()
//! ```
//!
//! The body owns its working data; the scope is the only channel back
//! into the engine. Keeping the scope narrow is what makes the pause
//! and cancel guarantees checkable: the body can only block inside
//! `poll_for_stop`, so once it returns or unwinds there are no user
//! frames left on the worker stack.

use crate::signal::ThinkResult;

/// A unit of user-supplied background work.
///
/// # Contract
///
/// | Obligation | Why |
/// |------------|-----|
/// | Call `scope.poll_for_stop()?` at progress points | Pause and cancel are cooperative |
/// | Call `scope.publish()` after finishing a write window | Watchers are notified through it |
/// | Return `Ok(())` only on natural completion | It is reported as `Finished` |
/// | Propagate `Err(Interrupt)` untouched | The runner consumes it at its boundary |
///
/// A body that never polls cannot be paused or canceled; the engine
/// does not preempt.
///
/// # Example
///
/// ```
/// use mull_thinker::{Think, ThinkResult, ThinkScope};
///
/// struct Summer {
///     upto: u64,
///     total: u64,
/// }
///
/// impl Think for Summer {
///     fn think(&mut self, scope: &dyn ThinkScope) -> ThinkResult {
///         for n in 0..self.upto {
///             self.total += n;
///             scope.publish();
///             scope.poll_for_stop()?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Think: Send + 'static {
    /// Runs the computation to completion or until interrupted.
    ///
    /// Invoked exactly once, on a pooled worker thread chosen by the
    /// engine.
    fn think(&mut self, scope: &dyn ThinkScope) -> ThinkResult;
}

/// The capability handed to a running body.
///
/// Implemented by the runtime; bodies receive it as `&dyn ThinkScope`
/// and must not retain it beyond the `think` call.
pub trait ThinkScope {
    /// Cooperative suspension point.
    ///
    /// Returns promptly while the computation should keep going. When
    /// a pause has been requested, blocks with no user frames below it
    /// until resumed. Returns `Err(Interrupt)` once a cancel has been
    /// requested; the body must propagate it with `?`.
    fn poll_for_stop(&self) -> ThinkResult;

    /// Marks the end of a write window on the body's observable
    /// output, fanning a throttled change notification out to the
    /// attached watchers.
    fn publish(&self);
}

/// Adapter turning a closure into a [`Think`] body.
///
/// Mostly used through
/// [`Thinker::from_fn`](crate::Thinker::from_fn); tests and small
/// applications rarely need a named body type.
pub struct FnThinker<F>(F);

impl<F> FnThinker<F>
where
    F: FnMut(&dyn ThinkScope) -> ThinkResult + Send + 'static,
{
    /// Wraps a closure as a thinker body.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Think for FnThinker<F>
where
    F: FnMut(&dyn ThinkScope) -> ThinkResult + Send + 'static,
{
    fn think(&mut self, scope: &dyn ThinkScope) -> ThinkResult {
        (self.0)(scope)
    }
}
