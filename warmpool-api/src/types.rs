//! Lifecycle enums shared between executor implementations and observers.

use std::fmt;

/// Lifecycle of a pool. Transitions are monotonic:
/// `Running -> ShuttingDown -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PoolState {
    /// Accepting tasks.
    Running = 0,

    /// Refusing new tasks, draining the queue.
    ShuttingDown = 1,

    /// Queue drained and every worker gone.
    Terminated = 2,
}

impl PoolState {
    pub fn is_running(self) -> bool {
        self == PoolState::Running
    }

    pub fn is_terminated(self) -> bool {
        self == PoolState::Terminated
    }
}

/// Role of a worker within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    /// Counted toward `core_pool_size`; never evicted for idleness.
    Core,

    /// Created beyond the core set; retires after `keep_alive` of idleness.
    Overflow,
}

/// Execution state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting for a task.
    Idle,

    /// Executing a task.
    Running,

    /// Deregistered; the thread is exiting.
    Terminated,
}

/// Identifier of a worker, unique within its pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}
