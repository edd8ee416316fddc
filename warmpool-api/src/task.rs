//! # Tasks
//!
//! A [`Task`] is the unit of work accepted by an executor: a boxed
//! zero-argument closure plus the instant it was submitted. The timestamp is
//! only used for diagnostics (queue wait time); ordering among queued tasks is
//! plain FIFO.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-unique sequence number assigned to every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

type Job = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// An opaque unit of work.
pub struct Task {
    id: TaskId,
    submitted_at: Instant,
    job: Job,
}

impl Task {
    /// Wrap an infallible closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            f();
            Ok(())
        })
    }

    /// Wrap a closure whose `Err` is reported as a task failure.
    pub fn fallible<F>(f: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            id: TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)),
            submitted_at: Instant::now(),
            job: Box::new(f),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn submitted_at(&self) -> Instant {
        self.submitted_at
    }

    /// Time elapsed since submission.
    pub fn age(&self) -> Duration {
        self.submitted_at.elapsed()
    }

    /// Consume the task and run its body on the current thread.
    ///
    /// Panics propagate; callers that need isolation wrap this in
    /// `catch_unwind`.
    pub fn run(self) -> anyhow::Result<()> {
        (self.job)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("age", &self.age())
            .finish_non_exhaustive()
    }
}
