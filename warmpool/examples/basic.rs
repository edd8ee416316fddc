/// # Basic Example
///
/// Submits twenty one-second tasks to a pool that can hold fourteen of them,
/// lets it work for five seconds, then shuts it down and waits for the drain.
use std::thread;
use std::time::Duration;

use tracing::{info, warn};
use warmpool::{PoolConfig, ThreadPool, TimeUnit, logging};

fn main() -> anyhow::Result<()> {
    logging::init_default();

    let pool = ThreadPool::new(PoolConfig::new(2, 4, 5, TimeUnit::Seconds, 10, 1))?;

    for n in 0..20 {
        let result = pool.execute(move || {
            info!(task = n, "started");
            thread::sleep(Duration::from_secs(1));
            info!(task = n, "completed");
        });
        if let Err(e) = result {
            warn!(task = n, error = %e, "rejected");
        }
    }

    thread::sleep(Duration::from_secs(5));

    pool.shutdown();
    pool.await_termination()?;
    info!(
        completed = pool.completed(),
        rejected = pool.rejected(),
        "pool terminated"
    );

    Ok(())
}
