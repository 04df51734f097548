//! Runner - per-thinker state machine on a pooled worker thread.
//!
//! Each [`Runner`] drives exactly one thinker body and owns the
//! pause/resume/cancel protocol between the controller and the worker.
//!
//! # State Machine
//!
//! ```text
//! Initializing ─► Thinking
//! Thinking     ─► Pausing | Canceling | Finished
//! Pausing      ─► Paused | Canceling
//! Paused       ─► Resuming | Canceled
//! Resuming     ─► Thinking | Canceling
//! Canceling    ─► Canceled
//! Finished     ─► Canceled      (post-finish cancel relabels, once)
//! Canceled     ─  terminal
//! ```
//!
//! The set is closed: any other edge is a programming error. A cancel
//! may be requested from any non-terminal state, which is where the
//! `Initializing/Pausing/Resuming → Canceling` edges come from; the
//! worker observes them at its next suspension point and unwinds
//! without entering `Paused`.
//!
//! # Synchronization
//!
//! One mutex (the signal mutex) guards the state; one condition
//! variable (the state-change signal) is pulsed on every transition.
//! Transitions are totally ordered per runner; across runners there is
//! no ordering. The worker blocks on controller direction in exactly
//! one place, inside [`poll_for_stop`](Runner::poll_for_stop)'s pause
//! wait; the controller blocks inside the `wait_for_*` operations.
//!
//! # Lifecycle
//!
//! 1. Created by the manager, submitted to the pool as a one-shot job
//! 2. Binds to the dispatching worker thread, runs the push handshake
//! 3. Drives the body, serving pause/cancel requests at poll points
//! 4. Writes its terminal state with no user frames left on the stack
//! 5. Releases the thinker and reports `finished(thinker, canceled)`

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use mull_thinker::{Interrupt, ThinkResult, ThinkScope, Thinker, ThinkerState};
use mull_types::invariant;

use crate::manager::ManagerShared;

/// Execution state of a runner.
///
/// Snapshots of this value (via [`Runner::state`] and the `is_*`
/// predicates) are only valid at the instant they are taken; clients
/// that need stability must use the `wait_for_*` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunnerState {
    /// Waiting for the pool to dispatch and the handshake to finish.
    Initializing,
    /// The body is executing on the worker thread.
    Thinking,
    /// A pause was requested; the worker has not yet reached a poll.
    Pausing,
    /// The worker is parked inside its poll; no user frames active.
    Paused,
    /// A resume was requested; the worker has not yet woken.
    Resuming,
    /// A cancel was requested; the worker has not yet observed it.
    Canceling,
    /// Terminal: stopped cooperatively (or relabeled after finish).
    Canceled,
    /// Terminal: the body returned naturally.
    Finished,
}

impl RunnerState {
    /// Returns `true` for `Canceled` and `Finished`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled | Self::Finished)
    }

    /// The closed transition table.
    fn may_become(self, to: Self) -> bool {
        use RunnerState::{
            Canceled, Canceling, Finished, Initializing, Paused, Pausing, Resuming, Thinking,
        };
        matches!(
            (self, to),
            (Initializing, Thinking)
                | (Initializing, Canceling)
                | (Thinking, Pausing)
                | (Thinking, Canceling)
                | (Thinking, Finished)
                | (Pausing, Paused)
                | (Pausing, Canceling)
                | (Paused, Resuming)
                | (Paused, Canceled)
                | (Resuming, Thinking)
                | (Resuming, Canceling)
                | (Canceling, Canceled)
                | (Finished, Canceled)
        )
    }
}

impl std::fmt::Display for RunnerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Initializing => "initializing",
            Self::Thinking => "thinking",
            Self::Pausing => "pausing",
            Self::Paused => "paused",
            Self::Resuming => "resuming",
            Self::Canceling => "canceling",
            Self::Canceled => "canceled",
            Self::Finished => "finished",
        };
        write!(f, "{name}")
    }
}

/// State machine driving one thinker on a pooled worker thread.
///
/// Constructed only by the manager. Request and wait operations may be
/// called from the controller or from a handle thread, never from the
/// runner's own worker thread (asserted).
pub struct Runner {
    thinker: Arc<Thinker>,
    state: Mutex<RunnerState>,
    // One controller talks to one worker, but a handle thread may wait
    // too, so transitions broadcast.
    state_changed: Condvar,
    worker: OnceLock<ThreadId>,
    adopted: AtomicBool,
    released: AtomicBool,
}

impl Runner {
    pub(crate) fn new(thinker: Arc<Thinker>) -> Self {
        Self {
            thinker,
            state: Mutex::new(RunnerState::Initializing),
            state_changed: Condvar::new(),
            worker: OnceLock::new(),
            adopted: AtomicBool::new(false),
            released: AtomicBool::new(false),
        }
    }

    /// The thinker this runner owns.
    #[must_use]
    pub fn thinker(&self) -> &Arc<Thinker> {
        &self.thinker
    }

    /// The worker thread this runner is bound to, once dispatched.
    #[must_use]
    pub fn worker_thread(&self) -> Option<ThreadId> {
        self.worker.get().copied()
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        *self.state.lock()
    }

    /// Snapshot: is the worker parked in `Paused`?
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state() == RunnerState::Paused
    }

    /// Snapshot: has the runner reached `Canceled`?
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.state() == RunnerState::Canceled
    }

    /// Snapshot: has the runner reached `Finished`?
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state() == RunnerState::Finished
    }

    /// Snapshot: is a pause or cancel waiting for the next poll?
    #[must_use]
    pub fn was_pause_requested(&self) -> bool {
        matches!(
            self.state(),
            RunnerState::Pausing | RunnerState::Canceling
        )
    }

    // ------------------------------------------------------------------
    // Requests (controller / handle side)
    // ------------------------------------------------------------------

    /// Requests a pause. Programming error if the runner is already
    /// pausing, paused or terminal.
    pub fn request_pause(&self) {
        self.request_pause_core(false);
    }

    /// Requests a pause, accepting runners that are already pausing,
    /// paused, canceled or finished as success.
    pub fn request_pause_canceled_ok(&self) {
        self.request_pause_core(true);
    }

    /// Blocks until the runner is `Paused`. Programming error if it
    /// reaches `Canceled` instead.
    pub fn wait_for_pause(&self) {
        self.wait_for_pause_core(false);
    }

    /// Blocks until the runner is `Paused`, `Canceled` or `Finished`.
    pub fn wait_for_pause_canceled_ok(&self) {
        self.wait_for_pause_core(true);
    }

    /// Requests a resume of a `Paused` runner. Programming error
    /// otherwise.
    pub fn request_resume(&self) {
        self.request_resume_core(false);
    }

    /// Requests a resume; a no-op on any non-`Paused` runner.
    pub fn request_resume_canceled_ok(&self) {
        self.request_resume_core(true);
    }

    /// Blocks until the state has left `Resuming`.
    pub fn wait_for_resume(&self) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        while *state == RunnerState::Resuming {
            self.state_changed.wait(&mut state);
        }
    }

    /// Requests a cancel. Valid from any non-terminal state;
    /// programming error if the runner is already canceling or
    /// canceled.
    pub fn request_cancel(&self) {
        self.request_cancel_core(false);
    }

    /// Requests a cancel; idempotent on already-canceling/canceled
    /// runners.
    pub fn request_cancel_canceled_ok(&self) {
        self.request_cancel_core(true);
    }

    /// Blocks until the runner is terminal and the manager has
    /// released the thinker.
    ///
    /// A `request_cancel` followed by `wait_for_finished` on the same
    /// thread establishes a happens-before with the terminal state
    /// write.
    pub fn wait_for_finished(&self) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        while !(state.is_terminal() && self.released.load(Ordering::Acquire)) {
            self.state_changed.wait(&mut state);
        }
    }

    /// Lets a paused runner run to natural completion, then blocks
    /// until it is terminal.
    pub fn request_finish_and_wait(&self) {
        self.assert_not_on_worker();
        {
            let mut state = self.state.lock();
            if *state == RunnerState::Paused {
                self.transition(&mut state, RunnerState::Resuming);
            }
        }
        self.wait_for_finished();
    }

    // ------------------------------------------------------------------
    // Request cores
    // ------------------------------------------------------------------

    fn request_pause_core(&self, canceled_ok: bool) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        loop {
            match *state {
                RunnerState::Thinking => {
                    self.transition(&mut state, RunnerState::Pausing);
                    return;
                }
                // Transitional: the worker settles these promptly.
                RunnerState::Initializing | RunnerState::Resuming => {
                    self.state_changed.wait(&mut state);
                }
                RunnerState::Pausing | RunnerState::Paused if canceled_ok => return,
                RunnerState::Canceling | RunnerState::Canceled | RunnerState::Finished
                    if canceled_ok =>
                {
                    return;
                }
                other => invariant!(
                    false,
                    "pause requested for thinker {} in state {other}",
                    self.thinker.id()
                ),
            }
        }
    }

    fn wait_for_pause_core(&self, canceled_ok: bool) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        loop {
            match *state {
                RunnerState::Paused => return,
                RunnerState::Canceled | RunnerState::Finished => {
                    invariant!(
                        canceled_ok,
                        "thinker {} reached {} while a strict pause wait was in progress",
                        self.thinker.id(),
                        *state
                    );
                    return;
                }
                _ => self.state_changed.wait(&mut state),
            }
        }
    }

    fn request_resume_core(&self, canceled_ok: bool) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        match *state {
            RunnerState::Paused => self.transition(&mut state, RunnerState::Resuming),
            _ if canceled_ok => {}
            other => invariant!(
                false,
                "resume requested for thinker {} in state {other}",
                self.thinker.id()
            ),
        }
    }

    fn request_cancel_core(&self, already_canceled_ok: bool) {
        self.assert_not_on_worker();
        let mut state = self.state.lock();
        match *state {
            RunnerState::Initializing
            | RunnerState::Thinking
            | RunnerState::Pausing
            | RunnerState::Resuming => {
                // Supersedes a pending pause: the worker observes
                // Canceling at its next poll and never enters Paused.
                self.transition(&mut state, RunnerState::Canceling);
            }
            RunnerState::Paused => {
                // The worker is parked inside its poll; wake it so it
                // unwinds.
                self.transition(&mut state, RunnerState::Canceled);
            }
            RunnerState::Finished => {
                self.transition(&mut state, RunnerState::Canceled);
                // Serialized with the reap by the signal mutex: if the
                // thinker has already been released, relabel it here;
                // otherwise the reap reads the live state and releases
                // it as canceled.
                if self.thinker.state().is_terminal() {
                    self.thinker.set_state(ThinkerState::Canceled);
                }
            }
            RunnerState::Canceling | RunnerState::Canceled => {
                invariant!(
                    already_canceled_ok,
                    "cancel requested twice for thinker {}",
                    self.thinker.id()
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Worker side
    // ------------------------------------------------------------------

    /// Cooperative suspension point, reached through the body's scope.
    ///
    /// Serves a pending pause by parking with no user frames below the
    /// poll; reports a pending cancel as [`Interrupt`].
    pub(crate) fn poll_for_stop(&self) -> ThinkResult {
        self.assert_on_worker();
        let mut state = self.state.lock();
        match *state {
            RunnerState::Thinking => Ok(()),
            RunnerState::Pausing => {
                self.transition(&mut state, RunnerState::Paused);
                match self.park_while_paused(&mut state) {
                    RunnerState::Resuming => {
                        self.transition(&mut state, RunnerState::Thinking);
                        Ok(())
                    }
                    // Canceling covers a cancel that trailed a resume
                    // before this worker woke.
                    RunnerState::Canceling | RunnerState::Canceled => Err(Interrupt),
                    other => mull_types::invariant_failed(
                        "paused worker woken by resume or cancel",
                        &format!("paused thinker {} woke in state {other}", self.thinker.id()),
                    ),
                }
            }
            RunnerState::Canceling | RunnerState::Canceled => Err(Interrupt),
            other => mull_types::invariant_failed(
                "poll reached from a running state",
                &format!("poll from thinker {} in state {other}", self.thinker.id()),
            ),
        }
    }

    /// Waits while `Paused`; returns the state that ended the park.
    fn park_while_paused(&self, state: &mut MutexGuard<'_, RunnerState>) -> RunnerState {
        while **state == RunnerState::Paused {
            self.state_changed.wait(state);
        }
        **state
    }

    /// Drives the whole runner lifecycle on the dispatching pool
    /// thread.
    pub(crate) fn run(self: Arc<Self>, shared: &ManagerShared) {
        let thread = thread::current().id();
        invariant!(
            self.worker.set(thread).is_ok(),
            "runner for thinker {} dispatched twice",
            self.thinker.id()
        );
        debug!(thinker = %self.thinker.id(), name = self.thinker.name(), "runner dispatched");

        shared.wait_for_push_to_thread(&self);
        shared.register_worker(&self, thread);

        let canceled_before_start = {
            let mut state = self.state.lock();
            if *state == RunnerState::Canceling {
                self.transition(&mut state, RunnerState::Canceled);
                true
            } else {
                self.transition(&mut state, RunnerState::Thinking);
                false
            }
        };

        if !canceled_before_start {
            let scope = RunScope {
                runner: self.as_ref(),
                shared,
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.thinker.think(&scope)));
            match outcome {
                Ok(Ok(())) => self.settle_natural_finish(),
                Ok(Err(Interrupt)) => self.settle_stop(None),
                Err(payload) => self.settle_stop(Some(&panic_message(payload.as_ref()))),
            }
        }

        shared.unregister_worker(thread);
        // The reap decides the released label (and the finished
        // report) from the live state, so a relabel that raced the
        // settle above lands exactly once.
        let was_canceled = shared.reap(&self);

        {
            let _state = self.state.lock();
            self.released.store(true, Ordering::Release);
            self.state_changed.notify_all();
        }

        shared.emit_finished(&self.thinker, was_canceled);
        info!(
            thinker = %self.thinker.id(),
            name = self.thinker.name(),
            canceled = was_canceled,
            "runner finished"
        );
    }

    /// Settles the terminal state after the body returned naturally.
    ///
    /// A pause that lost the race to completion is still honored: the
    /// runner parks in `Paused` with the body already off the stack,
    /// and finishes once resumed (or cancels).
    fn settle_natural_finish(&self) {
        let mut state = self.state.lock();
        loop {
            match *state {
                RunnerState::Thinking => {
                    self.transition(&mut state, RunnerState::Finished);
                    return;
                }
                RunnerState::Canceling => {
                    // Cancel arrived after the last poll.
                    self.transition(&mut state, RunnerState::Canceled);
                    return;
                }
                RunnerState::Pausing => {
                    self.transition(&mut state, RunnerState::Paused);
                    match self.park_while_paused(&mut state) {
                        RunnerState::Resuming => {
                            self.transition(&mut state, RunnerState::Thinking);
                        }
                        RunnerState::Canceling => {
                            self.transition(&mut state, RunnerState::Canceled);
                            return;
                        }
                        RunnerState::Canceled => return,
                        other => invariant!(
                            false,
                            "paused thinker {} woke in state {other}",
                            self.thinker.id()
                        ),
                    }
                }
                other => invariant!(
                    false,
                    "thinker {} completed in state {other}",
                    self.thinker.id()
                ),
            }
        }
    }

    /// Settles the terminal state after the body unwound.
    ///
    /// `diagnostic` is set when the stop was not requested (a panic or
    /// a spontaneous `Err(Interrupt)`); per the engine's policy both
    /// are reported as canceled completions.
    fn settle_stop(&self, diagnostic: Option<&str>) {
        if let Some(message) = diagnostic {
            error!(
                thinker = %self.thinker.id(),
                name = self.thinker.name(),
                "body unwound on its own, treating as canceled: {message}"
            );
        }
        let mut state = self.state.lock();
        match *state {
            RunnerState::Canceling => self.transition(&mut state, RunnerState::Canceled),
            RunnerState::Canceled => {}
            RunnerState::Thinking | RunnerState::Pausing | RunnerState::Resuming => {
                if diagnostic.is_none() {
                    warn!(
                        thinker = %self.thinker.id(),
                        "body returned a stop that was never requested"
                    );
                }
                self.transition(&mut state, RunnerState::Canceling);
                self.transition(&mut state, RunnerState::Canceled);
            }
            other => invariant!(
                false,
                "thinker {} unwound in state {other}",
                self.thinker.id()
            ),
        }
    }

    // ------------------------------------------------------------------
    // Reap support (manager side, signal-mutex serialized)
    // ------------------------------------------------------------------

    /// Releases the thinker to the terminal state the runner actually
    /// holds, read under the signal mutex.
    ///
    /// Called exactly once, by the manager's reap, while it holds the
    /// registry lock. Taking the signal mutex here serializes the
    /// label decision with a `Finished -> Canceled` relabel: a relabel
    /// that lands first is read back as `Canceled`; one that lands
    /// later finds the thinker already released and rewrites its
    /// label itself. Returns whether the released label is canceled.
    pub(crate) fn release_thinker(&self) -> bool {
        let state = self.state.lock();
        invariant!(
            state.is_terminal(),
            "thinker {} released from non-terminal runner state {}",
            self.thinker.id(),
            *state
        );
        let was_canceled = *state == RunnerState::Canceled;
        self.thinker.release(if was_canceled {
            ThinkerState::Canceled
        } else {
            ThinkerState::Finished
        });
        was_canceled
    }

    /// Re-affirms the `Finished` label on the thinker unless a relabel
    /// has already (or concurrently) turned the runner `Canceled`.
    ///
    /// Holding the signal mutex makes the check-and-write atomic with
    /// respect to the relabel, so a legitimate cancellation is never
    /// clobbered back to `Finished`.
    pub(crate) fn confirm_finished(&self) {
        let state = self.state.lock();
        if *state == RunnerState::Finished {
            self.thinker.set_state(ThinkerState::Finished);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Applies one edge of the closed transition table and pulses the
    /// state-change signal. Caller holds the signal mutex.
    fn transition(&self, state: &mut MutexGuard<'_, RunnerState>, to: RunnerState) {
        invariant!(
            state.may_become(to),
            "illegal runner transition {} -> {to} for thinker {}",
            **state,
            self.thinker.id()
        );
        trace!(thinker = %self.thinker.id(), from = %**state, to = %to, "runner transition");
        **state = to;
        self.state_changed.notify_all();
    }

    pub(crate) fn mark_adopted(&self) {
        self.adopted.store(true, Ordering::Release);
    }

    pub(crate) fn is_adopted(&self) -> bool {
        self.adopted.load(Ordering::Acquire)
    }

    fn assert_on_worker(&self) {
        invariant!(
            self.worker.get() == Some(&thread::current().id()),
            "worker-side operation for thinker {} called off its worker thread",
            self.thinker.id()
        );
    }

    fn assert_not_on_worker(&self) {
        if let Some(worker) = self.worker.get() {
            invariant!(
                *worker != thread::current().id(),
                "request on thinker {} from its own worker thread",
                self.thinker.id()
            );
        }
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("thinker", &self.thinker.id())
            .field("state", &self.state())
            .field("worker", &self.worker.get())
            .finish_non_exhaustive()
    }
}

/// The scope handed to the body: polling reaches the runner, publish
/// reaches the manager's notification fan-out.
struct RunScope<'a> {
    runner: &'a Runner,
    shared: &'a ManagerShared,
}

impl ThinkScope for RunScope<'_> {
    fn poll_for_stop(&self) -> ThinkResult {
        self.runner.poll_for_stop()
    }

    fn publish(&self) {
        self.shared.unlock_thinker(self.runner.thinker());
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mull_thinker::Thinker;

    fn idle_runner() -> Runner {
        Runner::new(Thinker::from_fn("test", |_: &dyn ThinkScope| Ok(())))
    }

    #[test]
    fn starts_initializing() {
        let runner = idle_runner();
        assert_eq!(runner.state(), RunnerState::Initializing);
        assert!(!runner.is_paused());
        assert!(!runner.is_canceled());
        assert!(!runner.is_finished());
    }

    #[test]
    fn transition_table_accepts_documented_edges() {
        use RunnerState::{
            Canceled, Canceling, Finished, Initializing, Paused, Pausing, Resuming, Thinking,
        };
        let legal = [
            (Initializing, Thinking),
            (Initializing, Canceling),
            (Thinking, Pausing),
            (Thinking, Canceling),
            (Thinking, Finished),
            (Pausing, Paused),
            (Pausing, Canceling),
            (Paused, Resuming),
            (Paused, Canceled),
            (Resuming, Thinking),
            (Resuming, Canceling),
            (Canceling, Canceled),
            (Finished, Canceled),
        ];
        for (from, to) in legal {
            assert!(from.may_become(to), "{from} -> {to} must be legal");
        }
    }

    #[test]
    fn transition_table_rejects_everything_else() {
        use RunnerState::{
            Canceled, Canceling, Finished, Initializing, Paused, Pausing, Resuming, Thinking,
        };
        let all = [
            Initializing, Thinking, Pausing, Paused, Resuming, Canceling, Canceled, Finished,
        ];
        let mut legal_count = 0;
        for from in all {
            for to in all {
                if from.may_become(to) {
                    legal_count += 1;
                }
            }
        }
        assert_eq!(legal_count, 13);

        // Terminal monotonicity: Canceled has no outgoing edge at all,
        // Finished only the relabel.
        for to in all {
            assert!(!Canceled.may_become(to));
        }
        assert!(Finished.may_become(Canceled));
        assert!(!Finished.may_become(Thinking));
    }

    #[test]
    fn terminal_predicate() {
        assert!(RunnerState::Canceled.is_terminal());
        assert!(RunnerState::Finished.is_terminal());
        assert!(!RunnerState::Paused.is_terminal());
        assert!(!RunnerState::Canceling.is_terminal());
    }

    #[test]
    fn cancel_before_dispatch_marks_canceling() {
        let runner = idle_runner();
        runner.request_cancel();
        assert_eq!(runner.state(), RunnerState::Canceling);
        assert!(runner.was_pause_requested());
    }

    #[test]
    #[should_panic(expected = "cancel requested twice")]
    fn strict_double_cancel_is_a_programming_error() {
        let runner = idle_runner();
        runner.request_cancel();
        runner.request_cancel();
    }

    #[test]
    fn permissive_double_cancel_is_idempotent() {
        let runner = idle_runner();
        runner.request_cancel_canceled_ok();
        runner.request_cancel_canceled_ok();
        assert_eq!(runner.state(), RunnerState::Canceling);
    }

    #[test]
    fn permissive_resume_on_non_paused_is_a_noop() {
        let runner = idle_runner();
        runner.request_resume_canceled_ok();
        assert_eq!(runner.state(), RunnerState::Initializing);
    }

    #[test]
    #[should_panic(expected = "resume requested")]
    fn strict_resume_on_non_paused_is_a_programming_error() {
        let runner = idle_runner();
        runner.request_resume();
    }

    #[test]
    fn display_names() {
        assert_eq!(RunnerState::Initializing.to_string(), "initializing");
        assert_eq!(RunnerState::Canceling.to_string(), "canceling");
    }

    #[test]
    fn panic_message_extraction() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("static str");
        assert_eq!(panic_message(payload.as_ref()), "static str");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
