//! Notification throttling.
//!
//! A [`SignalThrottler`] wraps a callback and guarantees:
//!
//! - at most one delivery per configured interval,
//! - intervening pulses coalesce into one,
//! - after the last pulse, at least one delivery eventually happens
//!   (the trailing edge is not lost).
//!
//! ```text
//! pulses:     ││││││││        │││
//! delivered:  │       (400ms) │  │(trailing, 400ms after previous)
//! ```
//!
//! Trailing delivery is performed by a flusher thread that is spawned
//! lazily when a pulse has to be deferred, and exits as soon as it has
//! nothing left to deliver. Dropping the throttler stops the flusher;
//! a deferred delivery still owed at that point is discarded.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use mull_thinker::ChangeNotifier;

struct ThrottleState {
    last_emit: Option<Instant>,
    pending: bool,
    flusher_running: bool,
    closed: bool,
}

struct ThrottleInner {
    interval: Duration,
    sink: Box<dyn Fn() + Send + Sync>,
    state: Mutex<ThrottleState>,
    wake: Condvar,
}

/// Emit-at-most-once-per-interval wrapper around a callback.
///
/// # Example
///
/// ```
/// use mull_runtime::SignalThrottler;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let sink = {
///     let hits = Arc::clone(&hits);
///     move || {
///         hits.fetch_add(1, Ordering::SeqCst);
///     }
/// };
/// let throttler = SignalThrottler::new(Duration::from_millis(200), Box::new(sink));
///
/// for _ in 0..100 {
///     throttler.pulse();
/// }
/// // A burst coalesces: the leading edge fires immediately, the rest
/// // collapse into (at most) one trailing delivery.
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct SignalThrottler {
    inner: Arc<ThrottleInner>,
}

impl SignalThrottler {
    /// Creates a throttler delivering through `sink` at most once per
    /// `interval`.
    #[must_use]
    pub fn new(interval: Duration, sink: Box<dyn Fn() + Send + Sync>) -> Self {
        Self {
            inner: Arc::new(ThrottleInner {
                interval,
                sink,
                state: Mutex::new(ThrottleState {
                    last_emit: None,
                    pending: false,
                    flusher_running: false,
                    closed: false,
                }),
                wake: Condvar::new(),
            }),
        }
    }

    /// Requests a delivery.
    ///
    /// Delivers immediately when the interval has elapsed since the
    /// previous delivery (or none happened yet); otherwise records a
    /// pending delivery for the flusher's trailing edge.
    pub fn pulse(&self) {
        let now = Instant::now();
        {
            let mut state = self.inner.state.lock();
            if state.closed {
                return;
            }
            let due = state
                .last_emit
                .map_or(true, |at| now.duration_since(at) >= self.inner.interval);
            if !due {
                state.pending = true;
                if !state.flusher_running {
                    state.flusher_running = true;
                    spawn_flusher(Arc::clone(&self.inner));
                }
                return;
            }
            state.last_emit = Some(now);
            state.pending = false;
        }
        (self.inner.sink)();
    }

    /// The configured coalescing window.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }
}

impl Drop for SignalThrottler {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        self.inner.wake.notify_all();
    }
}

impl ChangeNotifier for SignalThrottler {
    fn notify(&self) {
        self.pulse();
    }
}

fn spawn_flusher(inner: Arc<ThrottleInner>) {
    let spawned = thread::Builder::new()
        .name("mull-throttle".into())
        .spawn(move || flusher_loop(&inner));
    if let Err(err) = spawned {
        debug!("could not spawn throttle flusher: {err}");
    }
}

/// Delivers deferred pulses at their deadline; exits when idle or
/// closed.
fn flusher_loop(inner: &ThrottleInner) {
    loop {
        {
            let mut state = inner.state.lock();
            loop {
                if state.closed || !state.pending {
                    state.flusher_running = false;
                    return;
                }
                // last_emit is set whenever pending is: a pulse only
                // defers after a previous delivery.
                let deadline = state.last_emit.map_or_else(Instant::now, |at| {
                    at + inner.interval
                });
                let now = Instant::now();
                if now >= deadline {
                    state.last_emit = Some(now);
                    state.pending = false;
                    break;
                }
                inner.wake.wait_until(&mut state, deadline);
            }
        }
        (inner.sink)();
    }
}
