//! # Thread Pool
//!
//! A bounded executor whose worker count floats between `core_pool_size` and
//! `max_pool_size`.
//!
//! ## Admission
//! `execute` decides in bounded time, under the pool lock:
//! 1. While the core set is incomplete, start a core worker for the task.
//! 2. Otherwise queue the task if there is room.
//! 3. Otherwise start an overflow worker for the task if below the maximum.
//! 4. Otherwise reject it.
//!
//! Worker slots are reserved in the registry under the lock; the thread
//! itself is started after the lock is released. A failed start gives the
//! slot back and rejects the task.
//!
//! ## Module Organization
//! - `queue`: bounded FIFO of waiting tasks
//! - `registry`: live workers and slot reservation
//! - `worker`: the fetch-execute loop and idle eviction
//! - `maintenance`: keeps `min_spare_threads` idle workers warm
//! - `shutdown`: drain and termination
//! - `metrics`: counters and snapshots

mod maintenance;
mod metrics;
mod queue;
mod registry;
mod shared;
mod shutdown;
mod worker;

pub use metrics::PoolMetrics;
pub use registry::WorkerSnapshot;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{debug, info, warn};
use uuid::Uuid;

use warmpool_api::{
    ExecuteError, Executor, NoopListener, PoolConfig, PoolListener, PoolState, RejectionReason,
    Task, TaskId, WorkerId, WorkerKind, WorkerState,
};

use crate::error::PoolError;
use crate::logging::current_subscriber;
use crate::{log_admission, log_error, pool_span};
use maintenance::SpareMaintainer;
use shared::Shared;
use worker::Worker;

/// Bounded, self-scaling thread pool.
///
/// Dropping the handle initiates shutdown without waiting; queued tasks
/// still run. Use [`ThreadPool::await_termination`] to wait for the drain.
pub struct ThreadPool {
    shared: Arc<Shared>,
    maintenance: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Build a pool with no listener.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Self::with_listener(config, Arc::new(NoopListener))
    }

    /// Build a pool that reports worker and task events to `listener`.
    ///
    /// Worker threads log through the subscriber that is current on the
    /// calling thread.
    pub fn with_listener(
        config: PoolConfig,
        listener: Arc<dyn PoolListener>,
    ) -> Result<Self, PoolError> {
        config.validate()?;

        let (maintenance_tx, maintenance_rx) = flume::unbounded();
        let shared = Arc::new(Shared::new(
            config,
            listener,
            maintenance_tx,
            current_subscriber(),
        ));

        let span = pool_span!(
            shared.pool_id,
            core = shared.config.core_pool_size,
            max = shared.config.max_pool_size,
            queue = shared.config.queue_capacity
        );
        let _guard = span.enter();

        let handle = SpareMaintainer::spawn(Arc::clone(&shared), maintenance_rx)
            .map_err(|e| PoolError::ThreadSpawn(format!("maintenance thread: {e}")))?;

        maintenance::ensure_spares(&shared);

        info!(
            keep_alive = ?shared.config.keep_alive,
            min_spare = shared.config.min_spare_threads,
            "thread pool started"
        );

        Ok(Self {
            shared,
            maintenance: Mutex::new(Some(handle)),
        })
    }

    /// Submit a closure.
    pub fn execute<F>(&self, f: F) -> Result<(), ExecuteError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.execute_task(Task::new(f))
    }

    /// Submit a pre-built task, such as one made with [`Task::fallible`].
    pub fn execute_task(&self, task: Task) -> Result<(), ExecuteError> {
        let task_id = task.id();

        let (id, kind, task) = {
            let mut inner = self.shared.lock();
            if !inner.state.is_running() {
                log_admission!(task_id, "closed");
                return Err(ExecuteError::PoolClosed);
            }
            self.shared.counters.record_submitted();

            if let Some(id) = inner.registry.reserve(WorkerKind::Core, WorkerState::Running) {
                (id, WorkerKind::Core, task)
            } else {
                let idle = inner.registry.idle_count();
                match inner.queue.offer(task, idle) {
                    Ok(()) => {
                        // With no core workers the queue could otherwise be
                        // left with nobody to run it.
                        let standby = if inner.registry.is_empty() {
                            inner.registry.reserve(WorkerKind::Overflow, WorkerState::Idle)
                        } else {
                            None
                        };
                        let queued = inner.queue.len();
                        drop(inner);

                        self.shared.notify_task_available();
                        log_admission!(task_id, "queued", queued);
                        if let Some(id) = standby {
                            self.spawn_standby(id);
                        }
                        return Ok(());
                    }
                    Err(task) => {
                        match inner.registry.reserve(WorkerKind::Overflow, WorkerState::Running) {
                            Some(id) => (id, WorkerKind::Overflow, task),
                            None => {
                                drop(inner);
                                return Err(
                                    self.reject(task_id, RejectionReason::QueueFullAndMaxReached)
                                );
                            }
                        }
                    }
                }
            }
        };

        match Worker::spawn(&self.shared, id, kind, Some(task)) {
            Ok(_) => {
                log_admission!(task_id, "spawned", worker = %id, kind = ?kind);
                Ok(())
            }
            Err(error) => {
                self.shared.release_slot(id);
                log_error!(error, worker = %id, "worker spawn failed");
                Err(self.reject(task_id, RejectionReason::WorkerSpawnFailed))
            }
        }
    }

    fn spawn_standby(&self, id: WorkerId) {
        if let Err(error) = Worker::spawn(&self.shared, id, WorkerKind::Overflow, None) {
            self.shared.release_slot(id);
            log_error!(error, worker = %id, "standby worker spawn failed");
        }
    }

    fn reject(&self, task_id: TaskId, reason: RejectionReason) -> ExecuteError {
        self.shared.counters.record_rejected();
        warn!(task = %task_id, %reason, "task rejected");
        self.shared.listener.on_task_rejected(task_id, reason);
        ExecuteError::Rejected { reason }
    }

    /// Stop accepting tasks and let the workers drain the queue. Does not
    /// block. Calling it again has no effect.
    pub fn shutdown(&self) {
        if !self.shared.begin_shutdown() {
            debug!(pool = %self.shared.pool_id, "shutdown already initiated");
        }
    }

    /// Block until every worker has exited.
    ///
    /// Does not initiate shutdown; call [`ThreadPool::shutdown`] first or this
    /// waits forever.
    pub fn await_termination(&self) -> Result<(), PoolError> {
        self.shared.wait_terminated(None);

        let handle = self
            .maintenance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| PoolError::Other(anyhow!("maintenance thread panicked")))?;
        }
        Ok(())
    }

    /// Block until every worker has exited or `timeout` elapses. Returns
    /// whether the pool terminated in time.
    pub fn await_termination_timeout(&self, timeout: Duration) -> bool {
        self.shared.wait_terminated(Instant::now().checked_add(timeout))
    }

    /// Resolves once the pool is [`PoolState::Terminated`].
    pub async fn terminated(&self) {
        let mut state = self.shared.subscribe_state();
        // The sender lives in `shared`, which outlives this borrow.
        let _ = state.wait_for(|state| state.is_terminated()).await;
    }

    pub fn state(&self) -> PoolState {
        self.shared.lock().state
    }

    /// Tasks that reached admission while the pool was running.
    pub fn submitted(&self) -> u64 {
        self.shared.counters.submitted()
    }

    pub fn rejected(&self) -> u64 {
        self.shared.counters.rejected()
    }

    pub fn completed(&self) -> u64 {
        self.shared.counters.completed()
    }

    pub fn failed(&self) -> u64 {
        self.shared.counters.failed()
    }

    /// Live workers, including reserved slots whose thread is starting.
    pub fn active_workers(&self) -> usize {
        self.shared.lock().registry.len()
    }

    pub fn queued_tasks(&self) -> usize {
        self.shared.lock().queue.len()
    }

    /// Consistent snapshot of worker and queue counts.
    pub fn metrics(&self) -> PoolMetrics {
        let inner = self.shared.lock();
        let counters = &self.shared.counters;
        let core_workers = inner.registry.core_count();

        PoolMetrics {
            state: inner.state,
            active_workers: inner.registry.len(),
            core_workers,
            overflow_workers: inner.registry.len() - core_workers,
            idle_workers: inner.registry.idle_count(),
            running_workers: inner.registry.running_count(),
            queued_tasks: inner.queue.len(),
            queue_capacity: inner.queue.capacity(),
            submitted: counters.submitted(),
            rejected: counters.rejected(),
            completed: counters.completed(),
            failed: counters.failed(),
        }
    }

    /// Per-worker snapshot, ordered by worker id.
    pub fn workers(&self) -> Vec<WorkerSnapshot> {
        self.shared.lock().registry.snapshot()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Identifier recorded in this pool's log spans.
    pub fn id(&self) -> Uuid {
        self.shared.pool_id
    }
}

impl Executor for ThreadPool {
    fn execute_task(&self, task: Task) -> Result<(), ExecuteError> {
        ThreadPool::execute_task(self, task)
    }

    fn shutdown(&self) {
        ThreadPool::shutdown(self)
    }

    fn state(&self) -> PoolState {
        ThreadPool::state(self)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.begin_shutdown();
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("ThreadPool")
            .field("id", &self.shared.pool_id)
            .field("state", &inner.state)
            .field("workers", &inner.registry.len())
            .field("queued", &inner.queue.len())
            .finish()
    }
}
