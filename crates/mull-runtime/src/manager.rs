//! Manager - registry and coordinator for runners.
//!
//! One [`Manager`] owns the worker pool's view of every runner: the
//! thinker registry (thinker → runner), the thread registry (worker
//! thread → runner), the push queue, and the observer hooks. The
//! thread that constructs the manager becomes the **controller
//! thread**; operations marked controller-only assert it.
//!
//! # Lock discipline
//!
//! Three locks form the whole coordination surface:
//!
//! | Lock | Guards | Held for |
//! |------|--------|----------|
//! | push mutex | push queue (§ push protocol) | O(queue) |
//! | maps mutex | thinker + thread registries | O(1), never across user code |
//! | signal mutex (per runner) | runner state | O(1) |
//!
//! The push mutex is disjoint from the other two. The single place
//! two of them nest is the reap: it reads the runner's live state
//! (signal mutex) inside the maps mutex, so registry removal and the
//! thinker's release are one atomic step even against a post-finish
//! relabel. Nothing ever acquires the maps mutex while holding a
//! signal mutex. The thinker cell's own state and watcher locks are
//! leaves below all three.
//!
//! # Registry invariants
//!
//! - A runner is registered iff its thinker is `OwnedByRunner`;
//!   removal and the thinker's release to a terminal state happen
//!   under one maps-mutex hold.
//! - A worker thread is registered iff a runner is executing or
//!   parked on it.
//! - Only one runner ever exists per thinker; a second registration is
//!   a programming error.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use mull_thinker::{Thinker, ThinkerState};
use mull_types::{invariant, ThinkerId};

use crate::config::{AdoptHook, FinishedHook, ManagerConfig, NotifyHook};
use crate::error::RuntimeError;
use crate::handle::Handle;
use crate::pool::WorkerPool;
use crate::push::PushQueue;
use crate::runner::Runner;
use crate::throttle::SignalThrottler;

struct Registry {
    thinkers: HashMap<ThinkerId, Arc<Runner>>,
    threads: HashMap<ThreadId, Arc<Runner>>,
}

/// State shared between the manager, its handles and its workers.
pub(crate) struct ManagerShared {
    maps: Mutex<Registry>,
    push: PushQueue,
    controller: ThreadId,
    pub(crate) throttle_interval: Duration,
    any_thinker_wrote: Option<SignalThrottler>,
    on_finished: Option<FinishedHook>,
    on_push_needed: Option<NotifyHook>,
    adopter: Option<AdoptHook>,
}

/// Registry and coordinator owning the worker pool's view of runners.
///
/// # Example
///
/// ```
/// use mull_runtime::{Manager, Thinker, ThinkScope, ThinkerState};
///
/// let manager = Manager::new();
/// let thinker = Thinker::from_fn("count", |scope: &dyn ThinkScope| {
///     for _ in 0..100 {
///         scope.poll_for_stop()?;
///     }
///     Ok(())
/// });
///
/// let handle = manager.create_runner_for(thinker.clone());
/// handle.wait_for_finished();
/// assert_eq!(thinker.state(), ThinkerState::Finished);
/// ```
pub struct Manager {
    shared: Arc<ManagerShared>,
    pool: WorkerPool,
}

static GLOBAL: OnceLock<Manager> = OnceLock::new();

impl Manager {
    /// Creates a manager with the default configuration. The calling
    /// thread becomes the controller.
    #[must_use]
    pub fn new() -> Self {
        match Self::with_config(ManagerConfig::new()) {
            Ok(manager) => manager,
            Err(err) => {
                mull_types::invariant_failed("default config is valid", &err.to_string())
            }
        }
    }

    /// Creates a manager from an explicit configuration.
    pub fn with_config(mut config: ManagerConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let any_thinker_wrote = config
            .on_any_thinker_wrote
            .take()
            .map(|hook| SignalThrottler::new(config.throttle_interval, hook));

        let shared = Arc::new(ManagerShared {
            maps: Mutex::new(Registry {
                thinkers: HashMap::new(),
                threads: HashMap::new(),
            }),
            push: PushQueue::new(),
            controller: thread::current().id(),
            throttle_interval: config.throttle_interval,
            any_thinker_wrote,
            on_finished: config.on_finished.take(),
            on_push_needed: config.on_push_needed.take(),
            adopter: config.thread_adopter.take(),
        });
        let pool = WorkerPool::new(config.pool_size);

        info!(pool_size = pool.size(), "manager started");
        Ok(Self { shared, pool })
    }

    /// The process-wide manager, created lazily with the default
    /// configuration on first access (that caller's thread becomes the
    /// controller).
    #[must_use]
    pub fn global() -> &'static Manager {
        GLOBAL.get_or_init(Manager::new)
    }

    /// Installs an explicitly configured manager as the process-wide
    /// one. Fails if a global manager already exists (including one
    /// created lazily by [`global`](Self::global)).
    pub fn install_global(manager: Manager) -> Result<(), RuntimeError> {
        GLOBAL
            .set(manager)
            .map_err(|_| RuntimeError::GlobalAlreadyInstalled)
    }

    // ------------------------------------------------------------------
    // Controller-only operations
    // ------------------------------------------------------------------

    /// Creates the runner for a thinker, registers it and submits it
    /// to the worker pool as a one-shot job. Controller-only.
    ///
    /// The worker-thread binding is deferred until the pool dispatches
    /// the job. Returns the application handle observing the thinker.
    ///
    /// # Panics
    ///
    /// Programming error if the thinker already has (or ever had) a
    /// runner.
    pub fn create_runner_for(&self, thinker: Arc<Thinker>) -> Handle {
        self.shared.assert_manager_thread();
        invariant!(
            thinker.state().is_owned(),
            "thinker {} resubmitted in state {}",
            thinker.id(),
            thinker.state()
        );

        let runner = Arc::new(Runner::new(Arc::clone(&thinker)));
        {
            let mut maps = self.shared.maps.lock();
            invariant!(
                !maps.thinkers.contains_key(&thinker.id()),
                "thinker {} already has a live runner",
                thinker.id()
            );
            maps.thinkers.insert(thinker.id(), Arc::clone(&runner));
        }

        let shared = Arc::clone(&self.shared);
        self.pool.execute(Box::new(move || runner.run(&shared)));
        debug!(thinker = %thinker.id(), name = thinker.name(), "runner queued to pool");

        Handle::new(thinker, Arc::clone(&self.shared))
    }

    /// Brings every registered runner to quiescence. Controller-only.
    ///
    /// Two phases over one registry snapshot: first request a pause
    /// from everyone (runners that are already pausing, canceled or
    /// finished count as success), then wait for each to get its body
    /// off the worker stack. Requesting before waiting lets the
    /// runners quiesce in parallel.
    pub fn ensure_all_paused(&self) {
        self.shared.assert_manager_thread();
        let snapshot = self.shared.snapshot_runners();
        for runner in &snapshot {
            runner.request_pause_canceled_ok();
        }
        for runner in &snapshot {
            runner.wait_for_pause_canceled_ok();
        }
        debug!(count = snapshot.len(), "all runners quiescent");
    }

    /// Resumes every runner currently parked in `Paused`;
    /// runners in other states are left alone. Controller-only.
    pub fn ensure_all_resumed(&self) {
        self.shared.assert_manager_thread();
        for runner in self.shared.snapshot_runners() {
            if runner.is_paused() {
                runner.request_resume_canceled_ok();
            }
        }
    }

    /// Sees a thinker through to natural completion. Controller-only.
    ///
    /// Resumes the runner if it is paused, then blocks until it
    /// finishes. Calling this on a canceled runner is a programming
    /// error; so is calling it for a thinker that was canceled before
    /// ever finishing.
    pub fn ensure_finished(&self, thinker: &Arc<Thinker>) {
        self.shared.assert_manager_thread();
        match self.shared.runner_for_thinker(thinker) {
            None => invariant!(
                thinker.state() == ThinkerState::Finished,
                "ensure_finished on thinker {} in state {}",
                thinker.id(),
                thinker.state()
            ),
            Some(runner) => {
                invariant!(
                    !runner.is_canceled(),
                    "ensure_finished on a canceled runner (thinker {})",
                    thinker.id()
                );
                if runner.is_paused() {
                    runner.request_resume();
                    runner.wait_for_resume();
                }
                runner.wait_for_finished();
                invariant!(
                    runner.is_finished(),
                    "thinker {} was canceled while ensure_finished waited",
                    thinker.id()
                );
                // Re-affirm rather than assign: a cancel relabeling the
                // runner right here must not be clobbered back to
                // Finished.
                runner.confirm_finished();
            }
        }
    }

    /// Drains the push queue once. Controller-only; a no-op without a
    /// configured thread adopter.
    pub fn process_pushes(&self) {
        self.shared.process_pushes_until(None);
    }

    /// Drains the push queue until the given runner has been adopted.
    /// Controller-only.
    pub fn process_pushes_until(&self, runner: &Arc<Runner>) {
        self.shared.process_pushes_until(Some(runner));
    }

    // ------------------------------------------------------------------
    // Any-thread operations
    // ------------------------------------------------------------------

    /// Cancels a thinker and waits until its runner is gone.
    ///
    /// May be called from any thread (a handle dropping, most often).
    /// Idempotent: an already-canceled thinker is success. A thinker
    /// whose runner already finished is relabeled `Canceled`.
    ///
    /// Post-condition: `thinker.state() == ThinkerState::Canceled`.
    pub fn request_and_wait_cancel(&self, thinker: &Arc<Thinker>) {
        self.shared.request_and_wait_cancel(thinker);
    }

    /// The runner for a thinker, while one is registered.
    ///
    /// # Panics
    ///
    /// Programming error if there is no runner and the thinker is not
    /// in a terminal state: every non-terminal thinker that was ever
    /// submitted has one.
    #[must_use]
    pub fn runner_for_thinker(&self, thinker: &Thinker) -> Option<Arc<Runner>> {
        self.shared.runner_for_thinker(thinker)
    }

    /// The runner currently bound to a worker thread, if any.
    #[must_use]
    pub fn runner_for_thread(&self, thread: ThreadId) -> Option<Arc<Runner>> {
        self.shared.runner_for_thread(thread)
    }

    /// The thinker whose body is executing (or parked) on a worker
    /// thread, if any.
    #[must_use]
    pub fn thinker_for_thread(&self, thread: ThreadId) -> Option<Arc<Thinker>> {
        self.shared
            .runner_for_thread(thread)
            .map(|runner| Arc::clone(runner.thinker()))
    }

    /// Fans out change notifications after a body's write window.
    ///
    /// Engine side: reached through the body's scope on `publish`.
    /// Pulses each attached watcher's throttler, then the manager-wide
    /// any-thinker-wrote throttler.
    pub fn unlock_thinker(&self, thinker: &Thinker) {
        self.shared.unlock_thinker(thinker);
    }

    /// Whether `thread` is the controller thread.
    #[must_use]
    pub fn is_manager_thread(&self, thread: ThreadId) -> bool {
        thread == self.shared.controller
    }

    /// Asserts the current thread is the controller.
    pub fn assert_manager_thread(&self) {
        self.shared.assert_manager_thread();
    }

    /// Asserts the current thread is not the controller.
    pub fn assert_not_manager_thread(&self) {
        self.shared.assert_not_manager_thread();
    }

    /// Asserts the current thread is a registered worker thread.
    pub fn assert_worker_thread(&self) {
        invariant!(
            self.shared
                .runner_for_thread(thread::current().id())
                .is_some(),
            "expected a registered worker thread"
        );
    }

    /// Number of registered (non-reaped) runners.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.shared.maps.lock().thinkers.len()
    }

    /// Number of worker threads in the pool.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        // Anything still registered must be terminal (mid-reap at
        // worst); an active runner here means the application lost
        // track of a handle. The pool drains after this body.
        let stragglers = self.shared.snapshot_runners();
        for runner in stragglers {
            invariant!(
                runner.state().is_terminal(),
                "manager dropped while thinker {} still has an active runner",
                runner.thinker().id()
            );
        }
        debug!("manager shutting down");
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("active", &self.active_count())
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl ManagerShared {
    pub(crate) fn assert_manager_thread(&self) {
        invariant!(
            thread::current().id() == self.controller,
            "controller-only operation called from a non-controller thread"
        );
    }

    pub(crate) fn assert_not_manager_thread(&self) {
        invariant!(
            thread::current().id() != self.controller,
            "worker-side operation called from the controller thread"
        );
    }

    fn snapshot_runners(&self) -> Vec<Arc<Runner>> {
        self.maps.lock().thinkers.values().cloned().collect()
    }

    pub(crate) fn runner_for_thinker(&self, thinker: &Thinker) -> Option<Arc<Runner>> {
        let runner = self.maps.lock().thinkers.get(&thinker.id()).cloned();
        if runner.is_none() {
            // A registered thinker only leaves the registry by being
            // released to a terminal state.
            invariant!(
                thinker.state().is_terminal(),
                "no runner for non-terminal thinker {}",
                thinker.id()
            );
        }
        runner
    }

    pub(crate) fn runner_for_thread(&self, thread: ThreadId) -> Option<Arc<Runner>> {
        self.maps.lock().threads.get(&thread).cloned()
    }

    pub(crate) fn request_and_wait_cancel(&self, thinker: &Arc<Thinker>) {
        match self.runner_for_thinker(thinker) {
            None => {
                // Already reaped (or finished): cancel degenerates to
                // the relabel.
                thinker.set_state(ThinkerState::Canceled);
            }
            Some(runner) => {
                runner.request_cancel_canceled_ok();
                runner.wait_for_finished();
                if thinker.state() != ThinkerState::Canceled {
                    // The runner finished naturally before the cancel
                    // landed; relabel.
                    thinker.set_state(ThinkerState::Canceled);
                }
            }
        }
        invariant!(
            thinker.state() == ThinkerState::Canceled,
            "thinker {} not canceled after request_and_wait_cancel",
            thinker.id()
        );
    }

    pub(crate) fn unlock_thinker(&self, thinker: &Thinker) {
        thinker.notify_watchers();
        if let Some(throttler) = &self.any_thinker_wrote {
            throttler.pulse();
        }
    }

    // ------------------------------------------------------------------
    // Worker-side registry maintenance
    // ------------------------------------------------------------------

    pub(crate) fn register_worker(&self, runner: &Arc<Runner>, thread: ThreadId) {
        let mut maps = self.maps.lock();
        invariant!(
            !maps.threads.contains_key(&thread),
            "worker thread registered twice"
        );
        maps.threads.insert(thread, Arc::clone(runner));
    }

    pub(crate) fn unregister_worker(&self, thread: ThreadId) {
        let mut maps = self.maps.lock();
        invariant!(
            maps.threads.remove(&thread).is_some(),
            "worker thread unregistered without being registered"
        );
    }

    /// Removes a terminal runner from the registry and releases its
    /// thinker, in one maps-mutex hold so observers see both together.
    ///
    /// The released label comes from the runner's live state (read
    /// under its signal mutex, the one place that lock nests inside
    /// the registry lock), not from a snapshot: a post-finish cancel
    /// that lands between the worker's terminal transition and this
    /// reap is therefore released as `Canceled`, never split across
    /// the two states. Returns whether the released label is canceled.
    pub(crate) fn reap(&self, runner: &Arc<Runner>) -> bool {
        let thinker_id = runner.thinker().id();
        let mut maps = self.maps.lock();
        invariant!(
            maps.thinkers.remove(&thinker_id).is_some(),
            "thinker {} reaped twice",
            thinker_id
        );
        runner.release_thinker()
    }

    pub(crate) fn emit_finished(&self, thinker: &Arc<Thinker>, was_canceled: bool) {
        if let Some(hook) = &self.on_finished {
            hook(thinker, was_canceled);
        }
    }

    // ------------------------------------------------------------------
    // Push protocol
    // ------------------------------------------------------------------

    /// Worker side of the push handshake. Without an adopter the
    /// handshake collapses: there is no affinity to move, so the
    /// runner is adopted on the spot.
    pub(crate) fn wait_for_push_to_thread(&self, runner: &Arc<Runner>) {
        self.assert_not_manager_thread();
        if self.adopter.is_none() {
            runner.mark_adopted();
            return;
        }
        self.push.enqueue_and_wait(runner, || {
            if let Some(hook) = &self.on_push_needed {
                hook();
            }
        });
    }

    /// Controller side of the push handshake.
    pub(crate) fn process_pushes_until(&self, target: Option<&Arc<Runner>>) {
        self.assert_manager_thread();
        let Some(adopter) = &self.adopter else {
            return;
        };
        self.push.drain_until(target, |runner| {
            let Some(thread) = runner.worker_thread() else {
                mull_types::invariant_failed(
                    "queued runner is bound to its worker",
                    "push requested before the runner bound a worker thread",
                );
            };
            adopter(runner, thread);
        });
    }
}
