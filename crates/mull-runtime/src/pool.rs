//! Owned worker pool.
//!
//! A fixed set of named OS threads consuming one-shot jobs from a
//! channel. The pool enforces structured shutdown: dropping it closes
//! the channel and joins every worker, so no engine thread outlives
//! the manager that owns the pool.
//!
//! Runner jobs contain their own panic boundary; the extra
//! `catch_unwind` here only keeps a worker thread alive if an engine
//! bug escapes that boundary, so the join in `Drop` cannot hang on a
//! dead worker.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use mull_types::invariant;
use tracing::{debug, error};

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads.
pub(crate) struct WorkerPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers. `size` is validated by the manager
    /// configuration and must be at least 1.
    pub(crate) fn new(size: usize) -> Self {
        invariant!(size > 0, "worker pool requires at least one thread");

        let (sender, receiver) = unbounded::<Job>();
        let workers = (0..size)
            .map(|index| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("mull-worker-{index}"))
                    .spawn(move || worker_loop(&receiver))
                    .unwrap_or_else(|err| {
                        mull_types::invariant_failed(
                            "worker thread spawned",
                            &format!("could not spawn pool worker: {err}"),
                        )
                    })
            })
            .collect();

        debug!(size, "worker pool started");
        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Queues a one-shot job. It may take a while before a worker
    /// picks it up.
    pub(crate) fn execute(&self, job: Job) {
        let Some(sender) = self.sender.as_ref() else {
            mull_types::invariant_failed("pool accepting jobs", "pool already shut down");
        };
        invariant!(sender.send(job).is_ok(), "worker pool channel closed early");
    }

    /// Number of worker threads.
    pub(crate) fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets each worker finish its current job
        // and exit.
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("pool worker exited by panic");
            }
        }
        debug!("worker pool drained");
    }
}

fn worker_loop(receiver: &Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!("pool job panicked past the runner boundary");
        }
    }
}
