//! Manager configuration and observer hooks.
//!
//! Event delivery in mull is an explicit observer capability: instead
//! of a signal/slot fabric, the application passes plain callbacks in
//! at construction and the engine invokes them at the documented
//! points. All hooks may be called from worker threads and must be
//! `Send + Sync`.
//!
//! | Hook | Fired | Throttled |
//! |------|-------|-----------|
//! | `on_finished` | once per runner exit | no |
//! | `on_any_thinker_wrote` | after any write window | yes (`throttle_interval`) |
//! | `on_push_needed` | a worker queued itself for adoption | no |
//! | `thread_adopter` | controller drains the push queue | no |

use std::sync::Arc;
use std::thread::ThreadId;
use std::time::Duration;

use mull_thinker::Thinker;

use crate::error::RuntimeError;
use crate::runner::Runner;

/// Coalescing window for the manager-wide "any thinker wrote" signal
/// and for freshly attached watchers.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(400);

/// Per-runner completion callback: the thinker and whether it was
/// canceled. Emitted exactly once per runner, after the thinker has
/// been released to its terminal state; a later Finished→Canceled
/// relabel does not fire it a second time.
pub type FinishedHook = Box<dyn Fn(&Arc<Thinker>, bool) + Send + Sync>;

/// Parameterless notification callback.
pub type NotifyHook = Box<dyn Fn() + Send + Sync>;

/// Affinity hook for hosts that tie objects to an owning thread.
///
/// Invoked on the controller, once per runner, with the runner whose
/// thinker must be re-parented onto its worker thread
/// ([`Runner::worker_thread`] is bound by then). Must not call back
/// into push-protocol operations.
pub type AdoptHook = Box<dyn Fn(&Arc<Runner>, ThreadId) + Send + Sync>;

/// Configuration for a [`Manager`](crate::Manager).
///
/// # Example
///
/// ```
/// use mull_runtime::{Manager, ManagerConfig};
/// use std::time::Duration;
///
/// let config = ManagerConfig::new()
///     .with_pool_size(2)
///     .with_throttle_interval(Duration::from_millis(100));
/// let manager = Manager::with_config(config).expect("valid config");
/// assert!(manager.is_manager_thread(std::thread::current().id()));
/// ```
pub struct ManagerConfig {
    pub(crate) throttle_interval: Duration,
    pub(crate) pool_size: usize,
    pub(crate) on_finished: Option<FinishedHook>,
    pub(crate) on_any_thinker_wrote: Option<NotifyHook>,
    pub(crate) on_push_needed: Option<NotifyHook>,
    pub(crate) thread_adopter: Option<AdoptHook>,
}

impl ManagerConfig {
    /// Creates the default configuration: a pool sized to the machine
    /// and a 400ms coalescing window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            pool_size: num_cpus::get().max(1),
            on_finished: None,
            on_any_thinker_wrote: None,
            on_push_needed: None,
            thread_adopter: None,
        }
    }

    /// Sets the coalescing window for throttled notifications.
    ///
    /// A zero interval disables coalescing (every write window
    /// notifies immediately).
    #[must_use]
    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    /// Sets the worker pool size. Must be at least 1.
    #[must_use]
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Installs the per-runner completion callback.
    #[must_use]
    pub fn on_finished<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Thinker>, bool) + Send + Sync + 'static,
    {
        self.on_finished = Some(Box::new(hook));
        self
    }

    /// Installs the manager-wide throttled write notification.
    #[must_use]
    pub fn on_any_thinker_wrote<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_any_thinker_wrote = Some(Box::new(hook));
        self
    }

    /// Installs the "a worker is waiting for adoption" notification.
    ///
    /// Only meaningful together with
    /// [`with_thread_adopter`](Self::with_thread_adopter); the
    /// application should react by arranging a controller-side call to
    /// [`Manager::process_pushes`](crate::Manager::process_pushes).
    #[must_use]
    pub fn on_push_needed<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_push_needed = Some(Box::new(hook));
        self
    }

    /// Installs the thread-affinity hook, enabling the full push
    /// handshake.
    ///
    /// Without an adopter (the default) workers skip the handshake:
    /// plain values have no event-loop affinity to move.
    #[must_use]
    pub fn with_thread_adopter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Arc<Runner>, ThreadId) + Send + Sync + 'static,
    {
        self.thread_adopter = Some(Box::new(hook));
        self
    }

    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.pool_size == 0 {
            return Err(RuntimeError::InvalidConfig(
                "pool_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("throttle_interval", &self.throttle_interval)
            .field("pool_size", &self.pool_size)
            .field("on_finished", &self.on_finished.is_some())
            .field("on_any_thinker_wrote", &self.on_any_thinker_wrote.is_some())
            .field("on_push_needed", &self.on_push_needed.is_some())
            .field("thread_adopter", &self.thread_adopter.is_some())
            .finish()
    }
}
