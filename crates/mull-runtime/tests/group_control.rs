//! Group pause/resume, cancel-supersedes-pause ordering, and
//! ensure_finished.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use mull_runtime::{
    Manager, ManagerConfig, RunnerState, ThinkScope, Thinker, ThinkerState,
};

/// A body that spins forever, bumping its counter and polling on
/// every iteration.
fn spinning_thinker(counter: Arc<AtomicU64>) -> Arc<Thinker> {
    Thinker::from_fn("spinner", move |scope: &dyn ThinkScope| loop {
        counter.fetch_add(1, Ordering::SeqCst);
        scope.poll_for_stop()?;
    })
}

fn wait_until_counting(counter: &AtomicU64) {
    let deadline = std::time::Instant::now() + Duration::from_secs(10);
    while counter.load(Ordering::SeqCst) == 0 {
        assert!(
            std::time::Instant::now() < deadline,
            "body never started counting"
        );
        thread::sleep(Duration::from_millis(1));
    }
}

mod group_pause {
    use super::*;

    #[test]
    fn pause_all_then_resume_all_then_cancel_all() {
        let manager = Manager::with_config(ManagerConfig::new().with_pool_size(4))
            .expect("valid config");

        let counters: Vec<Arc<AtomicU64>> =
            (0..3).map(|_| Arc::new(AtomicU64::new(0))).collect();
        let thinkers: Vec<Arc<Thinker>> = counters
            .iter()
            .map(|counter| spinning_thinker(Arc::clone(counter)))
            .collect();
        let _handles: Vec<_> = thinkers
            .iter()
            .map(|thinker| manager.create_runner_for(Arc::clone(thinker)))
            .collect();

        for counter in &counters {
            wait_until_counting(counter);
        }

        manager.ensure_all_paused();

        // Every runner reports Paused, and every body is quiescent: the
        // counters stop moving.
        let runners: Vec<_> = thinkers
            .iter()
            .map(|thinker| {
                manager
                    .runner_for_thinker(thinker)
                    .expect("paused runner stays registered")
            })
            .collect();
        for runner in &runners {
            assert_eq!(runner.state(), RunnerState::Paused);
        }
        let frozen: Vec<u64> = counters
            .iter()
            .map(|counter| counter.load(Ordering::SeqCst))
            .collect();
        thread::sleep(Duration::from_millis(50));
        for (counter, before) in counters.iter().zip(&frozen) {
            assert_eq!(counter.load(Ordering::SeqCst), *before);
        }

        manager.ensure_all_resumed();
        for (counter, before) in counters.iter().zip(&frozen) {
            let deadline = std::time::Instant::now() + Duration::from_secs(10);
            while counter.load(Ordering::SeqCst) == *before {
                assert!(
                    std::time::Instant::now() < deadline,
                    "resumed body made no progress"
                );
                thread::sleep(Duration::from_millis(1));
            }
        }

        for thinker in &thinkers {
            manager.request_and_wait_cancel(thinker);
            assert_eq!(thinker.state(), ThinkerState::Canceled);
        }
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn group_pause_accepts_an_already_canceled_runner() {
        let manager = Manager::with_config(ManagerConfig::new().with_pool_size(4))
            .expect("valid config");

        let live_counter = Arc::new(AtomicU64::new(0));
        let doomed_counter = Arc::new(AtomicU64::new(0));
        let live = spinning_thinker(Arc::clone(&live_counter));
        let doomed = spinning_thinker(Arc::clone(&doomed_counter));
        let _live_handle = manager.create_runner_for(Arc::clone(&live));
        let _doomed_handle = manager.create_runner_for(Arc::clone(&doomed));

        wait_until_counting(&live_counter);
        wait_until_counting(&doomed_counter);
        manager.request_and_wait_cancel(&doomed);

        manager.ensure_all_paused();
        assert!(manager
            .runner_for_thinker(&live)
            .expect("live runner registered")
            .is_paused());

        manager.ensure_all_resumed();
        manager.request_and_wait_cancel(&live);
    }

    #[test]
    fn pause_all_twice_is_harmless() {
        let manager = Manager::new();
        let counter = Arc::new(AtomicU64::new(0));
        let thinker = spinning_thinker(Arc::clone(&counter));
        let _handle = manager.create_runner_for(Arc::clone(&thinker));
        wait_until_counting(&counter);

        manager.ensure_all_paused();
        manager.ensure_all_paused();
        assert!(manager
            .runner_for_thinker(&thinker)
            .expect("runner registered")
            .is_paused());

        manager.ensure_all_resumed();
        manager.request_and_wait_cancel(&thinker);
    }
}

mod cancel_supersedes_pause {
    use super::*;

    #[test]
    fn runner_never_enters_paused() {
        let manager = Manager::new();

        let gate = Arc::new(AtomicBool::new(false));
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let thinker = {
            let gate = Arc::clone(&gate);
            let mut announced = false;
            Thinker::from_fn("gated", move |scope: &dyn ThinkScope| loop {
                if !announced {
                    announced = true;
                    started_tx.send(()).expect("controller is listening");
                }
                if gate.load(Ordering::SeqCst) {
                    scope.poll_for_stop()?;
                }
                thread::sleep(Duration::from_micros(50));
            })
        };
        let _handle = manager.create_runner_for(Arc::clone(&thinker));
        started_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("body starts");

        let runner = manager
            .runner_for_thinker(&thinker)
            .expect("runner registered");

        // Pause first; the body is not polling, so the request stays
        // pending.
        runner.request_pause();
        assert_eq!(runner.state(), RunnerState::Pausing);

        // The cancel supersedes the pause...
        runner.request_cancel();
        assert_eq!(runner.state(), RunnerState::Canceling);

        // ...and once the body polls, it unwinds without ever parking.
        gate.store(true, Ordering::SeqCst);
        runner.wait_for_finished();
        assert_eq!(runner.state(), RunnerState::Canceled);
        assert_eq!(thinker.state(), ThinkerState::Canceled);
    }

    #[test]
    fn pause_wait_accepts_cancel_under_the_permissive_flag() {
        let manager = Manager::new();
        let counter = Arc::new(AtomicU64::new(0));
        let thinker = spinning_thinker(Arc::clone(&counter));
        let _handle = manager.create_runner_for(Arc::clone(&thinker));
        wait_until_counting(&counter);

        let runner = manager
            .runner_for_thinker(&thinker)
            .expect("runner registered");
        runner.request_pause_canceled_ok();
        runner.request_cancel_canceled_ok();
        runner.wait_for_pause_canceled_ok();
        runner.wait_for_finished();
        assert!(runner.is_canceled());
    }
}

mod finishing {
    use super::*;

    #[test]
    fn ensure_finished_resumes_a_paused_thinker() {
        let manager = Manager::new();
        let counter = Arc::new(AtomicU64::new(0));
        let thinker = {
            let counter = Arc::clone(&counter);
            Thinker::from_fn("bounded", move |scope: &dyn ThinkScope| {
                for _ in 0..200_000 {
                    counter.fetch_add(1, Ordering::SeqCst);
                    scope.poll_for_stop()?;
                }
                Ok(())
            })
        };
        let handle = manager.create_runner_for(Arc::clone(&thinker));
        wait_until_counting(&counter);

        handle.pause();
        assert!(handle.is_paused());

        manager.ensure_finished(&thinker);
        assert_eq!(thinker.state(), ThinkerState::Finished);
        assert_eq!(counter.load(Ordering::SeqCst), 200_000);
    }

    #[test]
    fn ensure_finished_after_completion_is_a_noop() {
        let manager = Manager::new();
        let thinker = Thinker::from_fn("quick", |_: &dyn ThinkScope| Ok(()));
        let handle = manager.create_runner_for(Arc::clone(&thinker));
        handle.wait_for_finished();

        manager.ensure_finished(&thinker);
        assert_eq!(thinker.state(), ThinkerState::Finished);
    }

    #[test]
    fn request_finish_and_wait_covers_the_paused_case() {
        let manager = Manager::new();
        let counter = Arc::new(AtomicU64::new(0));
        let thinker = {
            let counter = Arc::clone(&counter);
            Thinker::from_fn("bounded", move |scope: &dyn ThinkScope| {
                for _ in 0..50_000 {
                    counter.fetch_add(1, Ordering::SeqCst);
                    scope.poll_for_stop()?;
                }
                Ok(())
            })
        };
        let handle = manager.create_runner_for(Arc::clone(&thinker));
        wait_until_counting(&counter);

        let runner = manager
            .runner_for_thinker(&thinker)
            .expect("runner registered");
        handle.pause();
        runner.request_finish_and_wait();
        assert!(runner.is_finished());
        assert_eq!(thinker.state(), ThinkerState::Finished);
    }

    #[test]
    fn pause_lost_to_natural_completion_still_parks() {
        let manager = Manager::new();

        // The body finishes without ever polling, so a pending pause
        // can only be honored at the natural-return boundary.
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let gate = Arc::new(AtomicBool::new(false));
        let thinker = {
            let gate = Arc::clone(&gate);
            Thinker::from_fn("no-poll", move |_: &dyn ThinkScope| {
                started_tx.send(()).expect("controller is listening");
                while !gate.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_micros(50));
                }
                Ok(())
            })
        };
        let _handle = manager.create_runner_for(Arc::clone(&thinker));
        started_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("body starts");

        let runner = manager
            .runner_for_thinker(&thinker)
            .expect("runner registered");
        runner.request_pause();
        gate.store(true, Ordering::SeqCst);

        // The body returns; the runner honors the pause by parking
        // with no user frames left.
        runner.wait_for_pause();
        assert!(runner.is_paused());

        runner.request_resume();
        runner.wait_for_finished();
        assert!(runner.is_finished());
        assert_eq!(thinker.state(), ThinkerState::Finished);
    }
}
