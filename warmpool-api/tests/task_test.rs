use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use warmpool_api::{Executor, ExecuteError, PoolState, Task};

#[test]
fn test_task_runs_closure() {
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let task = Task::new(move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    });

    assert!(task.run().is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_fallible_task_reports_error() {
    let task = Task::fallible(|| Err(anyhow!("upstream timed out")));
    let error = task.run().unwrap_err();
    assert_eq!(error.to_string(), "upstream timed out");
}

#[test]
fn test_task_ids_increase() {
    let first = Task::new(|| {});
    let second = Task::new(|| {});
    assert!(second.id() > first.id());
    assert!(first.submitted_at() <= second.submitted_at());
    assert!(format!("{:?}", first).contains("Task"));
}

/// Runs tasks inline on the submitting thread until shut down.
struct InlineExecutor {
    state: Mutex<PoolState>,
}

impl Executor for InlineExecutor {
    fn execute_task(&self, task: Task) -> Result<(), ExecuteError> {
        if *self.state.lock().unwrap() != PoolState::Running {
            return Err(ExecuteError::PoolClosed);
        }
        let _ = task.run();
        Ok(())
    }

    fn shutdown(&self) {
        *self.state.lock().unwrap() = PoolState::Terminated;
    }

    fn state(&self) -> PoolState {
        *self.state.lock().unwrap()
    }
}

#[test]
fn test_executor_provided_methods() {
    let executor = InlineExecutor { state: Mutex::new(PoolState::Running) };
    let counter = Arc::new(AtomicUsize::new(0));

    let counter_clone = counter.clone();
    executor.execute(move || {
        counter_clone.fetch_add(1, Ordering::SeqCst);
    }).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(!executor.is_shutdown());

    executor.shutdown();
    assert!(executor.is_shutdown());
    assert!(executor.is_terminated());
    assert_eq!(executor.execute(|| {}), Err(ExecuteError::PoolClosed));
}
