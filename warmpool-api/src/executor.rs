//! # Executor Trait
//!
//! The admission contract every pool implementation provides.
//!
//! ## Key Concepts
//! - Admission never blocks: it resolves to accept or reject in bounded time
//! - Shutdown is graceful, idempotent and non-blocking
//! - Accepted tasks always run to completion; there is no cancellation

use crate::errors::ExecuteError;
use crate::task::Task;
use crate::types::PoolState;

/// Common interface for bounded executors.
pub trait Executor: Send + Sync {
    /// Submit a pre-built task.
    ///
    /// Fails with [`ExecuteError::PoolClosed`] once shutdown has begun and with
    /// [`ExecuteError::Rejected`] when the pool has no room.
    fn execute_task(&self, task: Task) -> Result<(), ExecuteError>;

    /// Begin graceful termination. Calling it more than once has no further effect.
    fn shutdown(&self);

    /// Current lifecycle state.
    fn state(&self) -> PoolState;

    /// Submit a closure.
    fn execute<F>(&self, f: F) -> Result<(), ExecuteError>
    where
        F: FnOnce() + Send + 'static,
        Self: Sized,
    {
        self.execute_task(Task::new(f))
    }

    /// Whether `shutdown` has been called.
    fn is_shutdown(&self) -> bool {
        self.state() != PoolState::Running
    }

    /// Whether the pool has fully drained and every worker has exited.
    fn is_terminated(&self) -> bool {
        self.state() == PoolState::Terminated
    }
}
