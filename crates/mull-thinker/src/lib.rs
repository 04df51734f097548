//! Thinker capabilities for the mull background-computation engine.
//!
//! A *thinker* is a long-running, interruptible computation that an
//! application submits to the engine. This crate defines everything the
//! computation itself can see:
//!
//! - [`Think`] — the single-entry computation body
//! - [`ThinkScope`] — the narrow capability handed to the body
//!   (`poll_for_stop`, `publish`)
//! - [`Interrupt`] — the cooperative-stop control signal
//! - [`ThinkerState`] — the user-visible terminal state
//! - [`Thinker`] — the engine-side cell carrying identity, state,
//!   watchers and the boxed body
//!
//! # Cooperation Contract
//!
//! ```text
//!  controller                worker
//!  ──────────                ──────
//!  request_cancel ─────────► poll_for_stop() returns Err(Interrupt)
//!                            body propagates with `?`
//!                            runner catches at the boundary
//!  wait_for_finished ◄────── terminal state written, body off the stack
//! ```
//!
//! The body must call [`ThinkScope::poll_for_stop`] at progress points;
//! a body that never polls cannot be paused or canceled.
//!
//! # Example
//!
//! ```
//! use mull_thinker::{ThinkResult, ThinkScope, Thinker};
//!
//! let thinker = Thinker::from_fn("counter", |scope: &dyn ThinkScope| {
//!     for _ in 0..1_000 {
//!         // ... one unit of work ...
//!         scope.publish();
//!         scope.poll_for_stop()?;
//!     }
//!     Ok(())
//! });
//! assert_eq!(thinker.name(), "counter");
//! ```

mod signal;
mod state;
mod thinker;
mod traits;

pub mod testing;

pub use signal::{ChangeNotifier, Interrupt, ThinkResult};
pub use state::ThinkerState;
pub use thinker::Thinker;
pub use traits::{FnThinker, Think, ThinkScope};
