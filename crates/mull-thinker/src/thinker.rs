//! The engine-side thinker cell.
//!
//! [`Thinker`] is what the application constructs and what the engine
//! registries point at: identity, the user-visible state, the boxed
//! body, the attached change watchers, and the live-handle count. The
//! cell is shared (`Arc`) between the application's handles, the
//! manager's registry and the runner driving the body.
//!
//! Locking here is strictly leaf-level: the state mutex and the
//! watcher list are only ever held for O(1) work, and never while
//! calling into user code or into engine coordination locks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mull_types::{invariant, ThinkerId};
use parking_lot::{Mutex, RwLock};

use crate::signal::{ChangeNotifier, ThinkResult};
use crate::state::ThinkerState;
use crate::traits::{FnThinker, Think, ThinkScope};

/// A unit of background work, shared between application and engine.
///
/// Constructed by the application, then passed to the manager, which
/// creates the single runner that will ever own it. The application
/// keeps observing it through [`Handle`]s; the cell itself stays alive
/// as long as anyone references it.
///
/// [`Handle`]: https://docs.rs/mull-runtime
///
/// # Example
///
/// ```
/// use mull_thinker::{Thinker, ThinkerState, ThinkScope};
///
/// let thinker = Thinker::from_fn("warmup", |scope: &dyn ThinkScope| {
///     scope.poll_for_stop()?;
///     Ok(())
/// });
///
/// assert_eq!(thinker.state(), ThinkerState::OwnedByRunner);
/// assert!(!thinker.state().is_terminal());
/// ```
pub struct Thinker {
    id: ThinkerId,
    name: String,
    state: Mutex<ThinkerState>,
    body: Mutex<Box<dyn Think>>,
    watchers: RwLock<Vec<Arc<dyn ChangeNotifier>>>,
    handles: AtomicUsize,
}

impl Thinker {
    /// Creates a thinker cell around a body.
    ///
    /// The cell starts in [`ThinkerState::OwnedByRunner`]: ownership
    /// belongs to the runner the manager will create for it, and only
    /// that runner's exit releases it to a terminal state.
    #[must_use]
    pub fn new(name: impl Into<String>, body: impl Think) -> Arc<Self> {
        Arc::new(Self {
            id: ThinkerId::new(),
            name: name.into(),
            state: Mutex::new(ThinkerState::OwnedByRunner),
            body: Mutex::new(Box::new(body)),
            watchers: RwLock::new(Vec::new()),
            handles: AtomicUsize::new(0),
        })
    }

    /// Creates a thinker cell around a closure body.
    ///
    /// # Example
    ///
    /// ```
    /// use mull_thinker::{Thinker, ThinkScope};
    ///
    /// let t = Thinker::from_fn("noop", |_: &dyn ThinkScope| Ok(()));
    /// assert_eq!(t.name(), "noop");
    /// ```
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Arc<Self>
    where
        F: FnMut(&dyn ThinkScope) -> ThinkResult + Send + 'static,
    {
        Self::new(name, FnThinker::new(f))
    }

    /// Returns the thinker's identifier.
    #[must_use]
    pub fn id(&self) -> ThinkerId {
        self.id
    }

    /// Returns the name given at construction (used in log output).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the user-visible state.
    ///
    /// The state may change the moment this returns; anything that
    /// needs stability must go through the engine's wait operations.
    #[must_use]
    pub fn state(&self) -> ThinkerState {
        *self.state.lock()
    }

    // ------------------------------------------------------------------
    // Engine side. Applications observe; the runtime mutates.
    // ------------------------------------------------------------------

    /// Overwrites the user-visible state.
    ///
    /// Engine side: used by the manager for the direct-cancel path and
    /// the post-finish relabel. Application code never calls this.
    pub fn set_state(&self, state: ThinkerState) {
        *self.state.lock() = state;
    }

    /// Releases the thinker from runner ownership into a terminal
    /// state.
    ///
    /// Engine side: called exactly once per thinker, while the manager
    /// holds its registry lock, so the registry removal and the state
    /// transition are observed together.
    ///
    /// # Panics
    ///
    /// Programming error if the thinker is not currently owned or
    /// `to` is not terminal.
    pub fn release(&self, to: ThinkerState) {
        invariant!(to.is_terminal(), "release target must be terminal, got {to}");
        let mut state = self.state.lock();
        invariant!(
            state.is_owned(),
            "thinker {} released while in state {state}",
            self.id
        );
        *state = to;
        drop(state);
        tracing::debug!(thinker = %self.id, name = self.name, state = %to, "thinker released");
    }

    /// Runs the body. Engine side: invoked once, by the owning runner,
    /// on the worker thread.
    pub fn think(&self, scope: &dyn ThinkScope) -> ThinkResult {
        let mut body = self.body.lock();
        body.think(scope)
    }

    // ------------------------------------------------------------------
    // Watchers
    // ------------------------------------------------------------------

    /// Attaches a change notifier.
    ///
    /// Notifiers are compared by pointer identity for detaching.
    pub fn attach_watcher(&self, notifier: Arc<dyn ChangeNotifier>) {
        self.watchers.write().push(notifier);
    }

    /// Detaches a previously attached notifier (by pointer identity).
    ///
    /// Detaching a notifier that was never attached is a no-op.
    pub fn detach_watcher(&self, notifier: &Arc<dyn ChangeNotifier>) {
        // Compare data pointers only; vtable pointers for the same
        // concrete type can differ across codegen units.
        let target = Arc::as_ptr(notifier).cast::<()>();
        self.watchers
            .write()
            .retain(|w| !std::ptr::eq(Arc::as_ptr(w).cast::<()>(), target));
    }

    /// Fans a change notification out to every attached watcher.
    ///
    /// Engine side: called by the manager when the body ends a write
    /// window. Runs under a read hold only, so watchers may attach and
    /// detach concurrently.
    pub fn notify_watchers(&self) {
        for watcher in self.watchers.read().iter() {
            watcher.notify();
        }
    }

    /// Number of currently attached watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.watchers.read().len()
    }

    // ------------------------------------------------------------------
    // Handle bookkeeping
    // ------------------------------------------------------------------

    /// Records a new live handle; returns the new count.
    pub fn retain_handle(&self) -> usize {
        self.handles.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Records a dropped handle; returns the remaining count.
    ///
    /// # Panics
    ///
    /// Programming error if no handle was live.
    pub fn release_handle(&self) -> usize {
        let prev = self.handles.fetch_sub(1, Ordering::AcqRel);
        invariant!(prev > 0, "handle released twice for thinker {}", self.id);
        prev - 1
    }

    /// Number of live handles.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.handles.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Thinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thinker")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("watchers", &self.watcher_count())
            .field("handles", &self.handle_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedScope;

    #[test]
    fn starts_owned() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        assert_eq!(t.state(), ThinkerState::OwnedByRunner);
    }

    #[test]
    fn release_to_finished() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        t.release(ThinkerState::Finished);
        assert_eq!(t.state(), ThinkerState::Finished);
    }

    #[test]
    #[should_panic(expected = "released while in state")]
    fn double_release_is_a_programming_error() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        t.release(ThinkerState::Finished);
        t.release(ThinkerState::Canceled);
    }

    #[test]
    #[should_panic(expected = "release target must be terminal")]
    fn release_to_owned_is_a_programming_error() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        t.release(ThinkerState::OwnedByRunner);
    }

    #[test]
    fn relabel_after_finish() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        t.release(ThinkerState::Finished);
        t.set_state(ThinkerState::Canceled);
        assert_eq!(t.state(), ThinkerState::Canceled);
    }

    #[test]
    fn think_runs_the_body() {
        let t = Thinker::from_fn("sum", {
            let mut calls = 0;
            move |scope: &dyn ThinkScope| {
                calls += 1;
                assert_eq!(calls, 1);
                scope.publish();
                Ok(())
            }
        });

        let scope = ScriptedScope::never_stopping();
        assert!(t.think(&scope).is_ok());
        assert_eq!(scope.publish_count(), 1);
    }

    #[test]
    fn watcher_attach_notify_detach() {
        struct Hits(AtomicUsize);
        impl ChangeNotifier for Hits {
            fn notify(&self) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }

        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        let hits = Arc::new(Hits(AtomicUsize::new(0)));
        let notifier: Arc<dyn ChangeNotifier> = hits.clone();

        t.attach_watcher(notifier.clone());
        assert_eq!(t.watcher_count(), 1);

        t.notify_watchers();
        t.notify_watchers();
        assert_eq!(hits.0.load(Ordering::Relaxed), 2);

        t.detach_watcher(&notifier);
        assert_eq!(t.watcher_count(), 0);
        t.notify_watchers();
        assert_eq!(hits.0.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn handle_counting() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        assert_eq!(t.handle_count(), 0);
        assert_eq!(t.retain_handle(), 1);
        assert_eq!(t.retain_handle(), 2);
        assert_eq!(t.release_handle(), 1);
        assert_eq!(t.release_handle(), 0);
    }

    #[test]
    #[should_panic(expected = "handle released twice")]
    fn over_release_is_a_programming_error() {
        let t = Thinker::from_fn("t", |_: &dyn ThinkScope| Ok(()));
        t.release_handle();
    }
}
