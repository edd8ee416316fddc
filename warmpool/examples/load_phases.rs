/// # Load Phases Example
///
/// Drives a small pool through four load shapes and prints what happened:
///
/// - Moderate load that fits in the core set and queue
/// - A few long-running tasks
/// - Sustained pressure that overflows into extra workers and rejections
/// - A short burst of quick tasks
///
/// Pass a JSON config file path as the first argument to override the
/// default pool shape (`core=2, max=4, keep_alive=5s, queue=5, min_spare=1`).
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use warmpool::{
    PoolConfig, PoolListener, RejectionReason, TaskError, TaskId, ThreadPool, TimeUnit, logging,
};

/// Counts outcomes reported by the pool.
#[derive(Default)]
struct Stats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    rejected: AtomicUsize,
}

impl PoolListener for Stats {
    fn on_task_completed(&self, _task: TaskId, _elapsed: Duration) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_task_failed(&self, _task: TaskId, _error: &TaskError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    fn on_task_rejected(&self, _task: TaskId, _reason: RejectionReason) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }
}

fn submit_tasks(pool: &ThreadPool, count: usize, work: Duration) {
    for n in 0..count {
        let result = pool.execute(move || {
            info!(task = n, "started");
            thread::sleep(work);
            info!(task = n, "completed");
        });
        if let Err(e) = result {
            warn!(task = n, error = %e, "not accepted");
        }
    }
}

fn wait_for_tasks(pool: &ThreadPool, seconds: u64) {
    info!(seconds, "waiting");
    thread::sleep(Duration::from_secs(seconds));
    let metrics = pool.metrics();
    info!(
        workers = metrics.active_workers,
        idle = metrics.idle_workers,
        queued = metrics.queued_tasks,
        "pool after wait"
    );
}

fn main() -> anyhow::Result<()> {
    logging::init_development();

    let config = match std::env::args().nth(1) {
        Some(path) => PoolConfig::from_json_file(path)?,
        None => PoolConfig::new(2, 4, 5, TimeUnit::Seconds, 5, 1),
    };

    let stats = Arc::new(Stats::default());
    let pool = ThreadPool::with_listener(config, stats.clone())?;
    info!(pool = %pool.id(), "starting load phases");

    info!("phase 1: moderate load");
    submit_tasks(&pool, 10, Duration::from_millis(1000));
    wait_for_tasks(&pool, 15);

    info!("phase 2: long-running tasks");
    submit_tasks(&pool, 5, Duration::from_millis(5000));
    wait_for_tasks(&pool, 10);

    info!("phase 3: high load with rejections");
    submit_tasks(&pool, 20, Duration::from_millis(500));
    wait_for_tasks(&pool, 15);

    info!("phase 4: burst of tasks");
    submit_tasks(&pool, 30, Duration::from_millis(200));
    wait_for_tasks(&pool, 15);

    info!("initiating shutdown");
    pool.shutdown();
    pool.await_termination()?;

    let metrics = pool.metrics();
    info!(
        completed = stats.completed.load(Ordering::Relaxed),
        failed = stats.failed.load(Ordering::Relaxed),
        rejected = stats.rejected.load(Ordering::Relaxed),
        submitted = metrics.submitted,
        "final statistics"
    );

    Ok(())
}
