//! # Spare-Thread Maintenance
//!
//! A background thread that keeps at least `min_spare_threads` idle workers
//! ready, so a burst after a quiet period finds warm threads instead of
//! paying thread start-up on the admission path.
//!
//! The thread runs a pass every `maintenance_interval` and whenever a worker
//! reports going idle or terminating. Reports arrive over a `flume` channel;
//! several reports queued behind one another are handled by a single pass.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError};
use tracing::{debug, trace};

use warmpool_api::{WorkerKind, WorkerState};

use super::shared::Shared;
use super::worker::Worker;
use crate::log_error;

/// Triggers delivered to the maintenance thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MaintenanceEvent {
    WorkerIdle,
    WorkerTerminated,
    Shutdown,
}

pub(crate) struct SpareMaintainer {
    shared: Arc<Shared>,
    events: Receiver<MaintenanceEvent>,
    interval: Duration,
}

impl SpareMaintainer {
    pub(crate) fn spawn(
        shared: Arc<Shared>,
        events: Receiver<MaintenanceEvent>,
    ) -> io::Result<JoinHandle<()>> {
        let interval = shared.config.effective_maintenance_interval();
        let name = format!("{}-maintenance", shared.config.thread_name_prefix);
        let maintainer = SpareMaintainer {
            shared,
            events,
            interval,
        };

        thread::Builder::new().name(name).spawn(move || {
            let dispatch = maintainer.shared.dispatch.clone();
            tracing::dispatcher::with_default(&dispatch, || maintainer.run());
        })
    }

    fn run(self) {
        debug!(pool = %self.shared.pool_id, interval = ?self.interval, "spare maintenance started");

        while ensure_spares(&self.shared) {
            let event = match self.events.recv_timeout(self.interval) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let shutdown_requested = event == MaintenanceEvent::Shutdown
                || self
                    .events
                    .try_iter()
                    .any(|event| event == MaintenanceEvent::Shutdown);
            if shutdown_requested {
                break;
            }
        }

        debug!(pool = %self.shared.pool_id, "spare maintenance stopped");
    }
}

/// Spawn standby workers until `min_spare_threads` workers are idle or the
/// pool is full. Returns `false` once the pool has stopped running.
pub(crate) fn ensure_spares(shared: &Arc<Shared>) -> bool {
    let target = shared.config.min_spare_threads;

    let reserved = {
        let mut inner = shared.lock();
        if !inner.state.is_running() {
            return false;
        }

        let deficit = target.saturating_sub(inner.registry.idle_count());
        let mut reserved = Vec::with_capacity(deficit);
        for _ in 0..deficit {
            match inner.registry.reserve(WorkerKind::Overflow, WorkerState::Idle) {
                Some(id) => reserved.push(id),
                None => break,
            }
        }
        reserved
    };

    if reserved.is_empty() {
        trace!(target_spares = target, "spare target satisfied");
        return true;
    }

    debug!(count = reserved.len(), target_spares = target, "spawning standby workers");
    for id in reserved {
        if let Err(error) = Worker::spawn(shared, id, WorkerKind::Overflow, None) {
            shared.release_slot(id);
            log_error!(error, worker = %id, "standby worker spawn failed");
        }
    }
    true
}
