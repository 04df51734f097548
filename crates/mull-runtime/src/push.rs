//! Move-to-thread push protocol.
//!
//! Some hosts tie an object's affinity to the thread running its
//! callbacks, and the pool only reveals the executing thread at
//! dispatch time. The push protocol is the one-time handshake that
//! lets a freshly dispatched worker ask the controller to re-parent
//! its thinker onto the worker thread before the body runs:
//!
//! ```text
//! worker                         controller
//! ──────                         ──────────
//! enqueue(runner)
//! signal needs_push ───────────► (woken, or told via on_push_needed)
//! wait on were_pushed            adopt each queued runner
//!                                broadcast were_pushed
//! observe adopted ◄──────────────┘
//! proceed to think()
//! ```
//!
//! This is the only mechanism by which controller and worker
//! synchronize directly outside the runner state machine. Without an
//! adopter hook configured, the handshake collapses: plain Rust values
//! carry no event-loop affinity, so the worker records its binding and
//! proceeds. The protocol's locks (one push mutex, two condvars) are
//! disjoint from the registry and signal mutexes.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::runner::Runner;

/// Queue of runners awaiting a controller-side adoption.
pub(crate) struct PushQueue {
    queue: Mutex<Vec<Arc<Runner>>>,
    needs_push: Condvar,
    were_pushed: Condvar,
}

impl PushQueue {
    pub(crate) fn new() -> Self {
        Self {
            queue: Mutex::new(Vec::new()),
            needs_push: Condvar::new(),
            were_pushed: Condvar::new(),
        }
    }

    /// Worker side: queue the runner, notify the controller, block
    /// until adopted.
    ///
    /// `notify` runs outside the push mutex; the adopted flag guards
    /// against the wakeup racing ahead of the wait.
    pub(crate) fn enqueue_and_wait(&self, runner: &Arc<Runner>, notify: impl FnOnce()) {
        {
            let mut queue = self.queue.lock();
            queue.push(Arc::clone(runner));
            self.needs_push.notify_one();
        }
        notify();

        let mut queue = self.queue.lock();
        while !runner.is_adopted() {
            self.were_pushed.wait(&mut queue);
        }
    }

    /// Controller side: adopt every queued runner; with a target,
    /// repeat until that runner has been adopted, otherwise return
    /// after one drain.
    pub(crate) fn drain_until(
        &self,
        target: Option<&Arc<Runner>>,
        adopt: impl Fn(&Arc<Runner>),
    ) {
        let mut queue = self.queue.lock();
        loop {
            let mut found = target.map_or(true, |t| t.is_adopted());
            for runner in queue.drain(..) {
                adopt(&runner);
                runner.mark_adopted();
                debug!(thinker = %runner.thinker().id(), "runner pushed to worker thread");
                if let Some(t) = target {
                    if Arc::ptr_eq(t, &runner) {
                        found = true;
                    }
                }
            }
            self.were_pushed.notify_all();
            if found {
                return;
            }
            self.needs_push.wait(&mut queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mull_thinker::{ThinkScope, Thinker};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn runner() -> Arc<Runner> {
        Arc::new(Runner::new(Thinker::from_fn("push-test", |_: &dyn ThinkScope| Ok(()))))
    }

    #[test]
    fn drain_without_target_returns_after_one_pass() {
        let queue = PushQueue::new();
        let adopted = AtomicUsize::new(0);
        queue.drain_until(None, |_| {
            adopted.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(adopted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drain_with_already_adopted_target_returns() {
        let queue = PushQueue::new();
        let r = runner();
        r.mark_adopted();
        queue.drain_until(Some(&r), |_| {});
    }

    #[test]
    fn handshake_adopts_the_worker() {
        let queue = Arc::new(PushQueue::new());
        let r = runner();
        let adopted = Arc::new(AtomicUsize::new(0));

        let worker = {
            let queue = Arc::clone(&queue);
            let r = Arc::clone(&r);
            thread::spawn(move || {
                queue.enqueue_and_wait(&r, || {});
            })
        };

        // Give the worker time to enqueue, then drive the controller
        // side until this specific runner is through.
        thread::sleep(Duration::from_millis(20));
        {
            let adopted = Arc::clone(&adopted);
            queue.drain_until(Some(&r), move |_| {
                adopted.fetch_add(1, Ordering::SeqCst);
            });
        }

        worker.join().expect("worker joins after adoption");
        assert!(r.is_adopted());
        assert_eq!(adopted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drain_waits_for_late_enqueue() {
        let queue = Arc::new(PushQueue::new());
        let r = runner();

        let late_worker = {
            let queue = Arc::clone(&queue);
            let r = Arc::clone(&r);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                queue.enqueue_and_wait(&r, || {});
            })
        };

        // The controller arrives first and parks on needs_push until
        // the worker shows up.
        queue.drain_until(Some(&r), |_| {});
        late_worker.join().expect("late worker joins");
        assert!(r.is_adopted());
    }
}
