//! Core types for the mull background-computation engine.
//!
//! This crate provides the foundational identifier, error-code and
//! invariant-checking types shared by every layer of mull.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Capability Layer                          │
//! │  (what application code depends on)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mull-types   : ThinkerId, ErrorCode, invariant!  ◄── HERE   │
//! │  mull-thinker : Think trait, ThinkScope, ThinkerState       │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! │  (engine implementation)                                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  mull-runtime : Runner, Manager, WorkerPool, Handle         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Error Model
//!
//! mull distinguishes two failure families:
//!
//! - **Recoverable library errors** implement [`ErrorCode`] and travel
//!   as `Result`s.
//! - **Programming errors** (illegal state transition, operation on the
//!   wrong thread, double registration) are fatal and raised through
//!   [`invariant!`], which records the caller's source location the way
//!   an assertion macro does.
//!
//! # Example
//!
//! ```
//! use mull_types::ThinkerId;
//!
//! let id = ThinkerId::new();
//! assert_ne!(id, ThinkerId::new());
//! ```

mod error;
mod id;
mod invariant;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::ThinkerId;
pub use invariant::invariant_failed;
