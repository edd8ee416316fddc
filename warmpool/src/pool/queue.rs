use std::collections::VecDeque;
use std::fmt;

use warmpool_api::Task;

/// Upper bound on up-front allocation; larger queues grow on demand.
const PREALLOCATE_LIMIT: usize = 1024;

/// Bounded FIFO of tasks waiting for a worker.
///
/// The queue lives inside the pool mutex together with the worker registry,
/// so producers (callers of `execute`) and consumers (workers) never touch it
/// concurrently; blocking and timed waits are done on the pool's condition
/// variable.
///
/// # Capacity
///
/// `capacity` bounds the number of *unclaimed* tasks. Every idle worker is
/// about to take one queued task, so [`TaskQueue::offer`] admits up to
/// `capacity + idle_consumers` entries: once the idle workers have claimed
/// theirs, at most `capacity` tasks remain waiting.
pub(crate) struct TaskQueue {
    tasks: VecDeque<Task>,
    capacity: usize,
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("len", &self.tasks.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl TaskQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            tasks: VecDeque::with_capacity(capacity.min(PREALLOCATE_LIMIT)),
            capacity,
        }
    }

    /// Non-blocking insert. Hands the task back when there is no room.
    pub(crate) fn offer(&mut self, task: Task, idle_consumers: usize) -> Result<(), Task> {
        if self.tasks.len() >= self.capacity.saturating_add(idle_consumers) {
            return Err(task);
        }
        self.tasks.push_back(task);
        Ok(())
    }

    /// Remove the oldest task.
    pub(crate) fn poll(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Remove every task, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<Task> {
        self.tasks.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }
}
