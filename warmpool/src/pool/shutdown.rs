//! Graceful shutdown.
//!
//! `Running -> ShuttingDown` happens once, under the pool lock, so no
//! admission can interleave with it. `ShuttingDown -> Terminated` happens
//! when the last worker deregisters with the queue empty.

use std::sync::PoisonError;
use std::time::Instant;

use tracing::{debug, info, warn};

use warmpool_api::PoolState;

use super::maintenance::MaintenanceEvent;
use super::shared::{Inner, Shared};

impl Shared {
    /// Stop admission and let the workers drain the queue.
    ///
    /// Returns `false` if shutdown had already been initiated.
    pub(crate) fn begin_shutdown(&self) -> bool {
        let (queued, workers) = {
            let mut inner = self.lock();
            if !inner.state.is_running() {
                return false;
            }

            self.set_state(&mut inner, PoolState::ShuttingDown);
            self.wake_all_workers();

            if inner.registry.is_empty() && !inner.queue.is_empty() {
                // Every worker died to spawn failures; nothing is left to
                // run what was accepted.
                let orphaned = inner.queue.drain();
                warn!(dropped = orphaned.len(), "no workers left to drain the queue");
            }

            let queued = inner.queue.len();
            let workers = inner.registry.len();
            self.try_terminate(&mut inner);
            (queued, workers)
        };

        self.notify_maintenance(MaintenanceEvent::Shutdown);
        info!(pool = %self.pool_id, queued, workers, "shutdown initiated");
        true
    }

    /// Move to `Terminated` if shutdown has begun and every worker is gone.
    /// Called with the pool lock held.
    pub(crate) fn try_terminate(&self, inner: &mut Inner) -> bool {
        if inner.state != PoolState::ShuttingDown || !inner.registry.is_empty() {
            return false;
        }

        self.set_state(inner, PoolState::Terminated);
        self.terminated.notify_all();
        debug!(pool = %self.pool_id, "pool terminated");
        true
    }

    /// Block until the pool is `Terminated`, or until `deadline` passes.
    /// Returns whether the pool terminated.
    pub(crate) fn wait_terminated(&self, deadline: Option<Instant>) -> bool {
        let mut inner = self.lock();
        while !inner.state.is_terminated() {
            match deadline {
                None => {
                    inner = self
                        .terminated
                        .wait(inner)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    inner = self
                        .terminated
                        .wait_timeout(inner, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use warmpool_api::{NoopListener, PoolConfig, Task, TimeUnit, WorkerKind, WorkerState};

    use super::*;

    fn shared(config: PoolConfig) -> Shared {
        let (tx, _rx) = flume::unbounded();
        Shared::new(config, Arc::new(NoopListener), tx, tracing::Dispatch::none())
    }

    #[test]
    fn test_shutdown_without_workers_terminates_immediately() {
        let shared = shared(PoolConfig::new(0, 2, 5, TimeUnit::Seconds, 4, 0));

        assert!(shared.begin_shutdown());
        assert!(!shared.begin_shutdown());
        assert_eq!(shared.lock().state, PoolState::Terminated);
        assert!(shared.wait_terminated(None));
        assert!(shared.subscribe_state().borrow().is_terminated());
    }

    #[test]
    fn test_live_worker_holds_termination() {
        let shared = shared(PoolConfig::new(1, 1, 5, TimeUnit::Seconds, 4, 0));
        let id = shared
            .lock()
            .registry
            .reserve(WorkerKind::Core, WorkerState::Running)
            .unwrap();

        assert!(shared.begin_shutdown());
        assert_eq!(shared.lock().state, PoolState::ShuttingDown);
        let deadline = Instant::now() + Duration::from_millis(20);
        assert!(!shared.wait_terminated(Some(deadline)));

        assert!(shared.release_slot(id));
        assert!(shared.wait_terminated(Some(deadline)));
    }

    #[test]
    fn test_orphaned_queue_is_dropped_on_shutdown() {
        let shared = shared(PoolConfig::new(0, 1, 5, TimeUnit::Seconds, 4, 0));
        shared.lock().queue.offer(Task::new(|| {}), 0).unwrap();

        assert!(shared.begin_shutdown());
        let inner = shared.lock();
        assert!(inner.queue.is_empty());
        assert_eq!(inner.state, PoolState::Terminated);
    }
}
