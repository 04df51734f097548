//! Application-side handles and watchers.
//!
//! A [`Handle`] is how application code keeps hold of a running
//! thinker: it observes state, issues pause/resume/cancel, and carries
//! the drop contract — when the *last* handle for a thinker is dropped
//! while the thinker is still owned by its runner, the engine cancels
//! it and waits for the worker to let go. Work never outlives the last
//! reference to it.
//!
//! A [`Watcher`] attaches to a handle and receives a throttled
//! callback whenever the body finishes a write window on its output:
//! at most one delivery per coalescing interval, with the trailing
//! edge guaranteed.

use std::sync::Arc;

use tracing::debug;

use mull_thinker::{ChangeNotifier, Thinker, ThinkerState};
use mull_types::ThinkerId;

use crate::manager::ManagerShared;
use crate::throttle::SignalThrottler;

/// Clonable reference to a running (or finished) thinker.
///
/// Produced by
/// [`Manager::create_runner_for`](crate::Manager::create_runner_for);
/// clones share the same underlying thinker and count toward the same
/// last-drop contract.
///
/// # Example
///
/// ```
/// use mull_runtime::{Manager, Thinker, ThinkScope, ThinkerState};
///
/// let manager = Manager::new();
/// let thinker = Thinker::from_fn("spin", |scope: &dyn ThinkScope| {
///     loop {
///         scope.poll_for_stop()?;
///     }
/// });
/// let handle = manager.create_runner_for(thinker);
///
/// // Dropping the only handle cancels the loop and waits it out.
/// let thinker = handle.thinker().clone();
/// drop(handle);
/// assert_eq!(thinker.state(), ThinkerState::Canceled);
/// ```
pub struct Handle {
    thinker: Arc<Thinker>,
    shared: Arc<ManagerShared>,
}

impl Handle {
    pub(crate) fn new(thinker: Arc<Thinker>, shared: Arc<ManagerShared>) -> Self {
        thinker.retain_handle();
        Self { thinker, shared }
    }

    /// The observed thinker.
    #[must_use]
    pub fn thinker(&self) -> &Arc<Thinker> {
        &self.thinker
    }

    /// The observed thinker's id.
    #[must_use]
    pub fn id(&self) -> ThinkerId {
        self.thinker.id()
    }

    /// Snapshot of the thinker's user-visible state.
    #[must_use]
    pub fn state(&self) -> ThinkerState {
        self.thinker.state()
    }

    /// Snapshot: did the thinker finish naturally (and stay that way)?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thinker.state() == ThinkerState::Finished
    }

    /// Snapshot: was the thinker canceled?
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.thinker.state() == ThinkerState::Canceled
    }

    /// Snapshot: is the worker currently parked in a pause?
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared
            .runner_for_thinker(&self.thinker)
            .is_some_and(|runner| runner.is_paused())
    }

    /// Requests a pause and waits until the body is off the worker
    /// stack (accepting cancel or natural finish as quiescence).
    pub fn pause(&self) {
        if let Some(runner) = self.shared.runner_for_thinker(&self.thinker) {
            runner.request_pause_canceled_ok();
            runner.wait_for_pause_canceled_ok();
        }
    }

    /// Resumes a paused thinker; a no-op in any other state.
    pub fn resume(&self) {
        if let Some(runner) = self.shared.runner_for_thinker(&self.thinker) {
            runner.request_resume_canceled_ok();
        }
    }

    /// Cancels the thinker and waits for its runner to be reaped.
    /// Idempotent.
    pub fn cancel(&self) {
        self.shared.request_and_wait_cancel(&self.thinker);
    }

    /// Blocks until the thinker has been released to a terminal state.
    pub fn wait_for_finished(&self) {
        if let Some(runner) = self.shared.runner_for_thinker(&self.thinker) {
            runner.wait_for_finished();
        }
    }

    /// Attaches a watcher; `callback` fires (throttled to the
    /// manager's coalescing interval) after write windows on the
    /// thinker's output.
    #[must_use]
    pub fn watch<F>(&self, callback: F) -> Watcher
    where
        F: Fn() + Send + Sync + 'static,
    {
        let notifier = Arc::new(SignalThrottler::new(
            self.shared.throttle_interval,
            Box::new(callback),
        ));
        self.thinker
            .attach_watcher(Arc::clone(&notifier) as Arc<dyn ChangeNotifier>);
        Watcher {
            thinker: Arc::clone(&self.thinker),
            notifier,
        }
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        self.thinker.retain_handle();
        Self {
            thinker: Arc::clone(&self.thinker),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let remaining = self.thinker.release_handle();
        if remaining == 0 && !self.thinker.state().is_terminal() {
            debug!(thinker = %self.thinker.id(), "last handle dropped, canceling");
            self.shared.request_and_wait_cancel(&self.thinker);
        }
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("thinker", &self.thinker.id())
            .field("state", &self.thinker.state())
            .finish_non_exhaustive()
    }
}

/// Throttled change observer attached to a thinker.
///
/// Detaches on drop; a deferred (coalesced) notification still owed at
/// that point is discarded with it.
pub struct Watcher {
    thinker: Arc<Thinker>,
    notifier: Arc<SignalThrottler>,
}

impl Watcher {
    /// The watched thinker's id.
    #[must_use]
    pub fn id(&self) -> ThinkerId {
        self.thinker.id()
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        let notifier = Arc::clone(&self.notifier) as Arc<dyn ChangeNotifier>;
        self.thinker.detach_watcher(&notifier);
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("thinker", &self.thinker.id())
            .finish_non_exhaustive()
    }
}
