//! mull runtime - the engine driving cooperative background
//! computations.
//!
//! Applications construct a [`Thinker`] around a body, hand it to a
//! [`Manager`], and get back a [`Handle`]. The manager creates one
//! [`Runner`] per thinker and submits it to an owned worker pool; the
//! runner drives the body through a strict lifecycle that the
//! controller can direct at any time:
//!
//! ```text
//!            controller thread                 pooled worker
//!            ─────────────────                 ─────────────
//! create_runner_for(thinker) ──queue job────► run()
//!                                             ├ bind worker thread
//!                                             ├ push handshake (§push)
//! request_pause ────────────────────────────► ├ think()
//! wait_for_pause ◄──── Paused ─────────────── │   poll_for_stop()
//! request_resume ───────────────────────────► │   poll_for_stop()
//! request_cancel ───────────────────────────► │   poll_for_stop() → unwind
//! wait_for_finished ◄── terminal, reaped ──── └ release thinker
//! ```
//!
//! # Modules
//!
//! - [`Manager`] - registry, group pause/resume, cancel-and-wait,
//!   push-protocol coordination, optional process-global instance
//! - [`Runner`] / [`RunnerState`] - the per-thinker state machine
//! - [`Handle`] / [`Watcher`] - the application surface
//! - [`SignalThrottler`] - coalesced change notification
//! - [`ManagerConfig`] - pool size, throttle interval, observer hooks
//!
//! # Guarantees
//!
//! - Pause, resume and cancel are cooperative and observed only at
//!   the body's poll points; after `wait_for_pause` returns, no user
//!   frame of that body is on any worker stack.
//! - Once a runner reaches `Canceled` or `Finished` it never returns
//!   to a non-terminal state (`Finished` may be relabeled `Canceled`
//!   exactly once).
//! - `request_cancel` + `wait_for_finished` on one thread establishes
//!   a happens-before with the terminal state write.
//! - The engine never calls user code again after it observes a
//!   cancellation.
//!
//! # Example
//!
//! ```
//! use mull_runtime::{Manager, Thinker, ThinkScope, ThinkerState};
//!
//! let manager = Manager::new();
//! let thinker = Thinker::from_fn("sum", |scope: &dyn ThinkScope| {
//!     let mut total = 0_u64;
//!     for n in 0..10_000 {
//!         total += n;
//!         scope.poll_for_stop()?;
//!     }
//!     scope.publish();
//!     Ok(())
//! });
//!
//! let handle = manager.create_runner_for(thinker.clone());
//! handle.wait_for_finished();
//! assert_eq!(thinker.state(), ThinkerState::Finished);
//! ```

mod config;
mod error;
mod handle;
mod manager;
mod pool;
mod push;
mod runner;
mod throttle;

pub use config::{
    AdoptHook, FinishedHook, ManagerConfig, NotifyHook, DEFAULT_THROTTLE_INTERVAL,
};
pub use error::RuntimeError;
pub use handle::{Handle, Watcher};
pub use manager::Manager;
pub use runner::{Runner, RunnerState};
pub use throttle::SignalThrottler;

// The capability layer, re-exported so applications depend on one
// crate.
pub use mull_thinker::{
    ChangeNotifier, FnThinker, Interrupt, Think, ThinkResult, ThinkScope, Thinker, ThinkerState,
};
pub use mull_types::{ErrorCode, ThinkerId};
