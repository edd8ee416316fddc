use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use warmpool::{ExecuteError, Executor, PoolConfig, PoolState, ThreadPool, TimeUnit};

mod test_helpers;
use test_helpers::{CountingListener, Gate, WAIT_TIMEOUT, wait_until};

#[test]
fn test_shutdown_twice_equals_once() {
    let pool = ThreadPool::new(PoolConfig::new(2, 4, 5, TimeUnit::Seconds, 4, 1)).unwrap();
    assert_eq!(pool.state(), PoolState::Running);

    pool.shutdown();
    pool.shutdown();
    pool.await_termination().unwrap();

    assert_eq!(pool.state(), PoolState::Terminated);
    pool.shutdown();
    assert_eq!(pool.state(), PoolState::Terminated);
    assert_eq!(pool.active_workers(), 0);
}

#[test]
fn test_execute_after_shutdown_is_closed() {
    let pool = ThreadPool::new(PoolConfig::new(1, 2, 5, TimeUnit::Seconds, 4, 0)).unwrap();
    pool.shutdown();

    let result = pool.execute(|| {});
    assert_eq!(result, Err(ExecuteError::PoolClosed));
    assert!(!result.unwrap_err().is_rejection());
    assert_eq!(pool.submitted(), 0);
    assert_eq!(pool.rejected(), 0);

    pool.await_termination().unwrap();
}

#[test]
fn test_queued_tasks_drain_after_shutdown() {
    let pool = ThreadPool::new(PoolConfig::new(1, 1, 5, TimeUnit::Seconds, 5, 0)).unwrap();
    let gate = Gate::new();
    let counter = Arc::new(AtomicUsize::new(0));

    let gate_clone = Arc::clone(&gate);
    pool.execute(move || gate_clone.wait()).unwrap();
    for _ in 0..5 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    assert_eq!(pool.queued_tasks(), 5);

    pool.shutdown();
    assert_eq!(pool.state(), PoolState::ShuttingDown);
    assert!(pool.is_shutdown());
    assert!(!pool.await_termination_timeout(Duration::from_millis(50)));

    gate.open();
    assert!(pool.await_termination_timeout(WAIT_TIMEOUT));
    assert_eq!(counter.load(Ordering::SeqCst), 5);
    assert_eq!(pool.completed(), 6);
    assert_eq!(pool.queued_tasks(), 0);
    assert!(pool.is_terminated());
}

#[test]
fn test_shutdown_does_not_block_on_running_task() {
    let pool = ThreadPool::new(PoolConfig::new(1, 1, 5, TimeUnit::Seconds, 0, 0)).unwrap();
    let gate = Gate::new();

    let gate_clone = Arc::clone(&gate);
    pool.execute(move || gate_clone.wait()).unwrap();

    // Returns while the task is still parked on the gate.
    pool.shutdown();
    assert_eq!(pool.state(), PoolState::ShuttingDown);
    assert_eq!(pool.metrics().running_workers, 1);

    gate.open();
    pool.await_termination().unwrap();
    assert_eq!(pool.completed(), 1);
}

#[test]
fn test_drop_initiates_shutdown() {
    let listener = CountingListener::new();
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let config = PoolConfig::new(2, 4, 5, TimeUnit::Seconds, 4, 1);
        let pool = ThreadPool::with_listener(config, listener.clone()).unwrap();
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    }

    assert!(wait_until(WAIT_TIMEOUT, || counter.load(Ordering::SeqCst) == 3));
    assert!(wait_until(WAIT_TIMEOUT, || {
        let started = CountingListener::get(&listener.started);
        started > 0 && CountingListener::get(&listener.terminated) == started
    }));
}

#[tokio::test]
async fn test_terminated_future_resolves() {
    let pool = ThreadPool::new(PoolConfig::new(1, 2, 5, TimeUnit::Seconds, 4, 1)).unwrap();
    pool.execute(|| std::thread::sleep(Duration::from_millis(20))).unwrap();

    pool.shutdown();
    tokio::time::timeout(WAIT_TIMEOUT, pool.terminated())
        .await
        .expect("pool did not terminate");

    assert_eq!(pool.state(), PoolState::Terminated);
    assert_eq!(pool.completed(), 1);
}
