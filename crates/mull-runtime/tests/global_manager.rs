//! The optional process-wide manager.
//!
//! Kept to a single test: the global's controller thread is whichever
//! thread touches it first, so everything global-related has to happen
//! in one place.

use std::sync::Arc;
use std::thread;

use mull_runtime::{Manager, RuntimeError, ThinkScope, Thinker, ThinkerState};

#[test]
fn global_manager_runs_thinkers_and_is_first_wins() {
    // First access creates the global; this thread becomes its
    // controller.
    let manager = Manager::global();
    assert!(manager.is_manager_thread(thread::current().id()));

    let thinker = Thinker::from_fn("global-count", |scope: &dyn ThinkScope| {
        for _ in 0..10_000 {
            scope.poll_for_stop()?;
        }
        Ok(())
    });
    let handle = manager.create_runner_for(Arc::clone(&thinker));
    handle.wait_for_finished();
    assert_eq!(thinker.state(), ThinkerState::Finished);

    // Repeated access observes the same instance.
    assert!(Manager::global().is_manager_thread(thread::current().id()));

    // Installing after the lazy creation is refused.
    let err = Manager::install_global(Manager::new())
        .expect_err("global slot is already occupied");
    assert!(matches!(err, RuntimeError::GlobalAlreadyInstalled));
}
