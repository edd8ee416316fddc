//! # Pool Listener
//!
//! An observer injected into a pool at construction. It replaces
//! process-global bookkeeping: callers count completions, failures and
//! rejections here instead of in shared statics.
//!
//! Callbacks run on the thread where the event happens (a worker thread for
//! task events, the submitting thread for rejections) and must not block.

use std::time::Duration;

use crate::errors::{RejectionReason, TaskError};
use crate::task::TaskId;
use crate::types::{WorkerId, WorkerKind};

/// Receives pool lifecycle events. Every method defaults to a no-op.
pub trait PoolListener: Send + Sync {
    /// A worker thread has started.
    fn on_worker_started(&self, _worker: WorkerId, _kind: WorkerKind) {}

    /// A worker has deregistered and its thread is exiting.
    fn on_worker_terminated(&self, _worker: WorkerId, _kind: WorkerKind) {}

    /// A task body returned normally.
    fn on_task_completed(&self, _task: TaskId, _elapsed: Duration) {}

    /// A task body panicked or returned an error.
    fn on_task_failed(&self, _task: TaskId, _error: &TaskError) {}

    /// A task was refused admission.
    fn on_task_rejected(&self, _task: TaskId, _reason: RejectionReason) {}
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PoolListener for NoopListener {}
