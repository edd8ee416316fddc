use std::sync::atomic::{AtomicU64, Ordering};

use warmpool_api::PoolState;

/// Pool-owned task counters. Updated atomically, read-only to callers.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    submitted: AtomicU64,
    rejected: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    pub(crate) fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }

    pub(crate) fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    pub(crate) fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Metrics about the pool state, taken under the pool lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Lifecycle state
    pub state: PoolState,

    /// Live workers of any kind
    pub active_workers: usize,

    /// Live workers counted toward `core_pool_size`
    pub core_workers: usize,

    /// Live overflow and standby workers
    pub overflow_workers: usize,

    /// Workers waiting for a task
    pub idle_workers: usize,

    /// Workers executing a task
    pub running_workers: usize,

    /// Tasks waiting in the queue
    pub queued_tasks: usize,

    /// Configured queue capacity
    pub queue_capacity: usize,

    /// Tasks that reached admission while the pool was running
    pub submitted: u64,

    /// Tasks refused admission
    pub rejected: u64,

    /// Task bodies that returned normally
    pub completed: u64,

    /// Task bodies that panicked or returned an error
    pub failed: u64,
}

impl PoolMetrics {
    /// Tasks that were admitted.
    pub fn accepted(&self) -> u64 {
        self.submitted.saturating_sub(self.rejected)
    }

    /// Accepted tasks that have not finished yet.
    pub fn outstanding(&self) -> u64 {
        self.accepted().saturating_sub(self.completed + self.failed)
    }
}
