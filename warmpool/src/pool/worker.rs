//! # Worker Thread
//!
//! One managed OS thread running a fetch-execute loop against the pool's
//! task queue.
//!
//! ## State Machine
//! `Idle -> Running -> Idle -> ... -> Terminated`
//!
//! - A worker created with an initial task starts `Running`.
//! - An idle core worker waits on the queue indefinitely.
//! - An idle overflow worker waits at most `keep_alive`; when that elapses
//!   with no task it retires, unless retiring would leave fewer than
//!   `min_spare_threads` idle workers, in which case it re-arms and stays.
//! - Once the pool stops running, every worker drains the queue and then
//!   deregisters.
//!
//! Task failures (panics and `Err` results) are caught here and never take
//! the worker down.

use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, trace, warn};

use warmpool_api::{Task, TaskError, WorkerId, WorkerKind, WorkerState};

use super::maintenance::MaintenanceEvent;
use super::shared::{Inner, Shared};
use crate::{log_error, log_worker, worker_span};

pub(crate) struct Worker {
    id: WorkerId,
    kind: WorkerKind,
    state: WorkerState,
    shared: Arc<Shared>,
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state)
            .finish()
    }
}

impl Worker {
    /// Start the thread for a slot already reserved in the registry.
    ///
    /// If the OS refuses the thread, the worker is dropped unstarted and its
    /// slot is released before this returns.
    pub(crate) fn spawn(
        shared: &Arc<Shared>,
        id: WorkerId,
        kind: WorkerKind,
        initial_task: Option<Task>,
    ) -> io::Result<JoinHandle<()>> {
        let worker = Worker {
            id,
            kind,
            state: if initial_task.is_some() {
                WorkerState::Running
            } else {
                WorkerState::Idle
            },
            shared: Arc::clone(shared),
        };

        #[cfg(test)]
        if shared.refuse_spawns.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(io::Error::other("thread spawn refused"));
        }

        thread::Builder::new()
            .name(format!("{}-{}", shared.config.thread_name_prefix, id.0))
            .spawn(move || {
                let dispatch = worker.shared.dispatch.clone();
                tracing::dispatcher::with_default(&dispatch, || worker.run(initial_task));
            })
    }

    fn run(mut self, initial_task: Option<Task>) {
        let span = worker_span!(self.shared.pool_id, self.id, self.kind);
        let _guard = span.enter();

        log_worker!(self.id, "started");
        self.shared.listener.on_worker_started(self.id, self.kind);

        if let Some(task) = initial_task {
            self.execute(task);
        }

        while let Some(task) = self.next_task() {
            self.execute(task);
        }

        self.shared.listener.on_worker_terminated(self.id, self.kind);
        self.shared.notify_maintenance(MaintenanceEvent::WorkerTerminated);
    }

    /// Go idle and wait for the next task. `None` means the worker has
    /// deregistered and must exit.
    fn next_task(&mut self) -> Option<Task> {
        let shared = Arc::clone(&self.shared);
        let mut inner = shared.lock();

        inner.registry.mark_idle(self.id);
        self.state = WorkerState::Idle;
        shared.notify_maintenance(MaintenanceEvent::WorkerIdle);

        // `None` when keep-alive is too large to represent: wait indefinitely.
        let mut deadline = Instant::now().checked_add(shared.config.keep_alive);

        loop {
            if let Some(task) = inner.queue.poll() {
                inner.registry.mark_running(self.id);
                self.state = WorkerState::Running;
                return Some(task);
            }

            if !inner.state.is_running() {
                self.retire(&mut inner, "drained");
                return None;
            }

            match (self.kind, deadline) {
                (WorkerKind::Core, _) | (WorkerKind::Overflow, None) => {
                    inner = shared.wait_for_task(inner, None);
                }
                (WorkerKind::Overflow, Some(at)) => {
                    let now = Instant::now();
                    if now < at {
                        inner = shared.wait_for_task(inner, Some(at - now));
                        continue;
                    }

                    // This worker is idle itself, so the count includes it.
                    if inner.registry.idle_count() > shared.config.min_spare_threads {
                        self.retire(&mut inner, "idle timeout");
                        return None;
                    }

                    trace!(worker = %self.id, "keep-alive elapsed, kept as spare");
                    deadline = now.checked_add(shared.config.idle_recheck_interval());
                }
            }
        }
    }

    /// Deregister under the pool lock.
    fn retire(&mut self, inner: &mut Inner, reason: &'static str) {
        inner.registry.release(self.id);
        self.state = WorkerState::Terminated;
        log_worker!(self.id, "retired", reason = reason, remaining = inner.registry.len());
        self.shared.try_terminate(inner);
    }

    fn execute(&mut self, task: Task) {
        let task_id = task.id();
        trace!(task = %task_id, waited = ?task.age(), "task started");

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.run()));
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(TaskError::Failed(error)),
            Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
        };

        match result {
            Ok(()) => {
                self.shared.counters.record_completed();
                trace!(task = %task_id, ?elapsed, "task completed");
                self.shared.listener.on_task_completed(task_id, elapsed);
            }
            Err(error) => {
                self.shared.counters.record_failed();
                log_error!(error, worker = %self.id, task = %task_id);
                self.shared.listener.on_task_failed(task_id, &error);
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // A worker that never started, or whose thread unwound through a
        // listener callback, still holds its slot.
        if self.state != WorkerState::Terminated && self.shared.release_slot(self.id) {
            if thread::panicking() {
                warn!(worker = %self.id, "worker thread unwound, slot released");
            } else {
                debug!(worker = %self.id, "unstarted worker dropped, slot released");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
