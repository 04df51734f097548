//! Runtime layer errors.
//!
//! The runtime's recoverable surface is deliberately small: almost
//! everything that can go wrong here is a programming error (illegal
//! transition, wrong thread, double registration) and is raised
//! fatally through `invariant!` instead. What remains as `Result`s is
//! configuration and process-global setup.
//!
//! # Error Code Convention
//!
//! All runtime errors use the `RUNTIME_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`InvalidConfig`](RuntimeError::InvalidConfig) | `RUNTIME_INVALID_CONFIG` | Yes |
//! | [`GlobalAlreadyInstalled`](RuntimeError::GlobalAlreadyInstalled) | `RUNTIME_GLOBAL_ALREADY_INSTALLED` | No |

use mull_types::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime layer error.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum RuntimeError {
    /// The manager configuration is unusable as given.
    ///
    /// **Recoverable** - fix the configuration and construct again.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A process-wide manager has already been installed.
    ///
    /// The global accessor is first-wins; a second installation would
    /// silently change which thread counts as the controller.
    ///
    /// **Not recoverable** - the existing global stays in place.
    #[error("a global manager is already installed")]
    GlobalAlreadyInstalled,
}

impl ErrorCode for RuntimeError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
            Self::GlobalAlreadyInstalled => "RUNTIME_GLOBAL_ALREADY_INSTALLED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => true,
            Self::GlobalAlreadyInstalled => false,
        }
    }
}
