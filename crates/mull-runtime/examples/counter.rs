//! Counter example
//!
//! Submits a counting thinker, pauses it midway, resumes it, and
//! either cancels it or lets it finish.
//!
//! # Usage
//!
//! ```bash
//! # Count to 5 million, with a pause/resume cycle in the middle
//! cargo run --example counter
//!
//! # Cancel instead of finishing
//! cargo run --example counter -- --cancel
//!
//! # Watch throttled progress notifications
//! cargo run --example counter -- --watch --debug
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use mull_runtime::{Manager, ThinkScope, Thinker};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "counter")]
#[command(about = "Counter example for mull")]
struct Args {
    /// How far to count
    #[arg(long, default_value_t = 5_000_000)]
    upto: u64,

    /// Cancel midway instead of finishing
    #[arg(long)]
    cancel: bool,

    /// Attach a throttled progress watcher
    #[arg(long)]
    watch: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== mull counter example ===");
    println!();

    let manager = Manager::new();
    println!("pool size: {}", manager.pool_size());

    let progress = Arc::new(AtomicU64::new(0));
    let thinker = {
        let progress = Arc::clone(&progress);
        let upto = args.upto;
        Thinker::from_fn("counter", move |scope: &dyn ThinkScope| {
            for n in 0..upto {
                progress.store(n + 1, Ordering::Relaxed);
                if n % 1024 == 0 {
                    scope.publish();
                }
                scope.poll_for_stop()?;
            }
            scope.publish();
            Ok(())
        })
    };

    let handle = manager.create_runner_for(Arc::clone(&thinker));

    let _watcher = if args.watch {
        let progress = Arc::clone(&progress);
        Some(handle.watch(move || {
            println!("progress: {}", progress.load(Ordering::Relaxed));
        }))
    } else {
        None
    };

    // Let it get going, then demonstrate the pause/resume cycle.
    std::thread::sleep(Duration::from_millis(50));
    handle.pause();
    println!(
        "paused at {} (worker quiescent)",
        progress.load(Ordering::Relaxed)
    );
    std::thread::sleep(Duration::from_millis(200));
    handle.resume();
    println!("resumed");

    if args.cancel {
        std::thread::sleep(Duration::from_millis(50));
        handle.cancel();
        println!(
            "canceled at {} of {}",
            progress.load(Ordering::Relaxed),
            args.upto
        );
    } else {
        handle.wait_for_finished();
        println!("finished at {}", progress.load(Ordering::Relaxed));
    }

    println!("final state: {}", thinker.state());
    Ok(())
}
