//! User-visible thinker state.
//!
//! The engine-side runner has a richer internal lifecycle; what the
//! application observes on the thinker itself is only who owns it and
//! how it ended.
//!
//! # State Lifecycle
//!
//! ```text
//! OwnedByRunner ──► Finished ──► Canceled   (post-finish cancel
//!       │                                    relabels, at most once)
//!       └─────────► Canceled
//! ```
//!
//! Exactly one runner ever owns a given thinker; the transition to a
//! terminal state happens atomically with the thinker's removal from
//! the manager's registry.

use serde::{Deserialize, Serialize};

/// Ownership / completion state of a thinker.
///
/// | State | Meaning | Terminal |
/// |-------|---------|----------|
/// | `OwnedByRunner` | A runner drives (or will drive) the body | No |
/// | `Finished` | Body returned naturally | Yes |
/// | `Canceled` | Stopped cooperatively, or relabeled after finish | Yes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThinkerState {
    /// The thinker belongs to a runner for the duration of execution.
    #[default]
    OwnedByRunner,

    /// The body ran to natural completion.
    ///
    /// May still be relabeled `Canceled` exactly once if a cancel is
    /// requested after the natural finish.
    Finished,

    /// The computation was stopped cooperatively.
    Canceled,
}

impl ThinkerState {
    /// Returns `true` once the thinker has been released by its runner.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Canceled)
    }

    /// Returns `true` while a runner owns the thinker.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::OwnedByRunner)
    }
}

impl std::fmt::Display for ThinkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OwnedByRunner => write!(f, "owned_by_runner"),
            Self::Finished => write!(f, "finished"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ThinkerState::Finished.is_terminal());
        assert!(ThinkerState::Canceled.is_terminal());
        assert!(!ThinkerState::OwnedByRunner.is_terminal());
    }

    #[test]
    fn owned_state() {
        assert!(ThinkerState::OwnedByRunner.is_owned());
        assert!(!ThinkerState::Finished.is_owned());
    }

    #[test]
    fn default_is_owned() {
        assert_eq!(ThinkerState::default(), ThinkerState::OwnedByRunner);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", ThinkerState::OwnedByRunner), "owned_by_runner");
        assert_eq!(format!("{}", ThinkerState::Finished), "finished");
        assert_eq!(format!("{}", ThinkerState::Canceled), "canceled");
    }
}
