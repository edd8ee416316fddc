use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use warmpool_api::{PoolConfig, PoolListener, PoolState, WorkerId};

use super::maintenance::MaintenanceEvent;
use super::metrics::Counters;
use super::queue::TaskQueue;
use super::registry::WorkerRegistry;

/// Everything guarded by the pool mutex.
#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) state: PoolState,
    pub(crate) queue: TaskQueue,
    pub(crate) registry: WorkerRegistry,
}

/// Pool state shared by the handle, the workers and the maintenance thread.
pub(crate) struct Shared {
    pub(crate) pool_id: Uuid,
    pub(crate) config: PoolConfig,
    inner: Mutex<Inner>,
    /// Signalled when a task is queued or the pool stops running.
    task_available: Condvar,
    /// Signalled when the pool reaches `Terminated`.
    pub(crate) terminated: Condvar,
    pub(crate) counters: Counters,
    state_tx: watch::Sender<PoolState>,
    maintenance_tx: flume::Sender<MaintenanceEvent>,
    pub(crate) listener: Arc<dyn PoolListener>,
    pub(crate) dispatch: tracing::Dispatch,
    /// Makes `Worker::spawn` fail as if the OS refused the thread.
    #[cfg(test)]
    pub(crate) refuse_spawns: std::sync::atomic::AtomicBool,
}

impl Shared {
    pub(crate) fn new(
        config: PoolConfig,
        listener: Arc<dyn PoolListener>,
        maintenance_tx: flume::Sender<MaintenanceEvent>,
        dispatch: tracing::Dispatch,
    ) -> Self {
        let inner = Inner {
            state: PoolState::Running,
            queue: TaskQueue::new(config.queue_capacity),
            registry: WorkerRegistry::new(config.core_pool_size, config.max_pool_size),
        };
        let (state_tx, _) = watch::channel(PoolState::Running);

        Self {
            pool_id: Uuid::new_v4(),
            config,
            inner: Mutex::new(inner),
            task_available: Condvar::new(),
            terminated: Condvar::new(),
            counters: Counters::default(),
            state_tx,
            maintenance_tx,
            listener,
            dispatch,
            #[cfg(test)]
            refuse_spawns: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Lock the pool state.
    ///
    /// Task bodies and listener callbacks never run under this lock, so a
    /// poisoned mutex still holds consistent data and is recovered.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block on the task condition variable, optionally bounded by `timeout`.
    pub(crate) fn wait_for_task<'a>(
        &self,
        guard: MutexGuard<'a, Inner>,
        timeout: Option<Duration>,
    ) -> MutexGuard<'a, Inner> {
        match timeout {
            None => self
                .task_available
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                self.task_available
                    .wait_timeout(guard, timeout)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        }
    }

    pub(crate) fn notify_task_available(&self) {
        self.task_available.notify_one();
    }

    pub(crate) fn wake_all_workers(&self) {
        self.task_available.notify_all();
    }

    /// Ask the maintenance thread for a pass. Never blocks.
    pub(crate) fn notify_maintenance(&self, event: MaintenanceEvent) {
        // The receiver only goes away after the pool stopped running.
        let _ = self.maintenance_tx.send(event);
    }

    /// Record a lifecycle transition. Called with the pool lock held.
    pub(crate) fn set_state(&self, inner: &mut Inner, state: PoolState) {
        debug_assert!(state >= inner.state, "pool state moved backwards");
        inner.state = state;
        self.state_tx.send_replace(state);
    }

    pub(crate) fn subscribe_state(&self) -> watch::Receiver<PoolState> {
        self.state_tx.subscribe()
    }

    /// Release a reserved slot whose thread never started or has stopped.
    pub(crate) fn release_slot(&self, id: WorkerId) -> bool {
        let mut inner = self.lock();
        let released = inner.registry.release(id).is_some();
        if released {
            self.try_terminate(&mut inner);
        }
        released
    }
}
