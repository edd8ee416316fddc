use std::collections::BTreeMap;
use std::time::Instant;

use warmpool_api::{WorkerId, WorkerKind, WorkerState};

/// Point-in-time view of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub kind: WorkerKind,
    pub state: WorkerState,
    pub spawned_at: Instant,
    pub last_active_at: Instant,
    pub tasks_run: u64,
}

#[derive(Debug, Clone)]
struct WorkerEntry {
    kind: WorkerKind,
    state: WorkerState,
    spawned_at: Instant,
    last_active_at: Instant,
    tasks_run: u64,
}

/// Book of every live worker, keyed by id.
///
/// Slot reservation is a check-and-insert on this map. Callers hold the pool
/// mutex, which makes the check and the insert a single atomic step with
/// respect to every other admission, maintenance pass and retirement.
#[derive(Debug)]
pub(crate) struct WorkerRegistry {
    workers: BTreeMap<WorkerId, WorkerEntry>,
    core_pool_size: usize,
    max_pool_size: usize,
    next_id: usize,
}

impl WorkerRegistry {
    pub(crate) fn new(core_pool_size: usize, max_pool_size: usize) -> Self {
        Self {
            workers: BTreeMap::new(),
            core_pool_size,
            max_pool_size,
            next_id: 1,
        }
    }

    /// Reserve a worker slot.
    ///
    /// Returns `None` when the pool is at `max_pool_size`, or for
    /// [`WorkerKind::Core`] when the core set is already complete. A worker
    /// reserved with an initial task starts out `Running`; a standby starts
    /// out `Idle`.
    pub(crate) fn reserve(&mut self, kind: WorkerKind, state: WorkerState) -> Option<WorkerId> {
        if self.workers.len() >= self.max_pool_size {
            return None;
        }
        if kind == WorkerKind::Core && self.core_count() >= self.core_pool_size {
            return None;
        }

        let id = WorkerId(self.next_id);
        self.next_id += 1;

        let now = Instant::now();
        self.workers.insert(
            id,
            WorkerEntry {
                kind,
                state,
                spawned_at: now,
                last_active_at: now,
                tasks_run: 0,
            },
        );
        Some(id)
    }

    /// Give a slot back. Returns the kind the worker had, or `None` if the
    /// slot was already released.
    pub(crate) fn release(&mut self, id: WorkerId) -> Option<WorkerKind> {
        self.workers.remove(&id).map(|entry| entry.kind)
    }

    pub(crate) fn mark_idle(&mut self, id: WorkerId) {
        if let Some(entry) = self.workers.get_mut(&id) {
            if entry.state == WorkerState::Running {
                entry.tasks_run += 1;
            }
            entry.state = WorkerState::Idle;
            entry.last_active_at = Instant::now();
        }
    }

    pub(crate) fn mark_running(&mut self, id: WorkerId) {
        if let Some(entry) = self.workers.get_mut(&id) {
            entry.state = WorkerState::Running;
            entry.last_active_at = Instant::now();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.workers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub(crate) fn core_count(&self) -> usize {
        self.count_where(|entry| entry.kind == WorkerKind::Core)
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.count_where(|entry| entry.state == WorkerState::Idle)
    }

    pub(crate) fn running_count(&self) -> usize {
        self.count_where(|entry| entry.state == WorkerState::Running)
    }

    fn count_where(&self, predicate: impl Fn(&WorkerEntry) -> bool) -> usize {
        self.workers.values().filter(|entry| predicate(entry)).count()
    }

    pub(crate) fn snapshot(&self) -> Vec<WorkerSnapshot> {
        self.workers
            .iter()
            .map(|(id, entry)| WorkerSnapshot {
                id: *id,
                kind: entry.kind,
                state: entry.state,
                spawned_at: entry.spawned_at,
                last_active_at: entry.last_active_at,
                tasks_run: entry.tasks_run,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_respects_max() {
        let mut registry = WorkerRegistry::new(1, 2);

        assert!(registry.reserve(WorkerKind::Core, WorkerState::Running).is_some());
        assert!(registry.reserve(WorkerKind::Overflow, WorkerState::Running).is_some());
        assert!(registry.reserve(WorkerKind::Overflow, WorkerState::Running).is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_core_reservation_stops_at_core_size() {
        let mut registry = WorkerRegistry::new(2, 4);

        assert!(registry.reserve(WorkerKind::Core, WorkerState::Running).is_some());
        assert!(registry.reserve(WorkerKind::Core, WorkerState::Running).is_some());
        assert!(registry.reserve(WorkerKind::Core, WorkerState::Running).is_none());
        assert_eq!(registry.core_count(), 2);
    }

    #[test]
    fn test_core_reservation_needs_a_free_slot() {
        let mut registry = WorkerRegistry::new(2, 2);

        // Standby overflow workers can fill the pool before the core set does.
        registry.reserve(WorkerKind::Overflow, WorkerState::Idle).unwrap();
        registry.reserve(WorkerKind::Overflow, WorkerState::Idle).unwrap();
        assert!(registry.reserve(WorkerKind::Core, WorkerState::Running).is_none());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut registry = WorkerRegistry::new(0, 1);
        let id = registry.reserve(WorkerKind::Overflow, WorkerState::Idle).unwrap();

        assert_eq!(registry.release(id), Some(WorkerKind::Overflow));
        assert_eq!(registry.release(id), None);
        assert!(registry.is_empty());
        assert!(registry.reserve(WorkerKind::Overflow, WorkerState::Idle).is_some());
    }

    #[test]
    fn test_state_counts_and_snapshot() {
        let mut registry = WorkerRegistry::new(1, 3);
        let core = registry.reserve(WorkerKind::Core, WorkerState::Running).unwrap();
        let spare = registry.reserve(WorkerKind::Overflow, WorkerState::Idle).unwrap();

        assert_eq!(registry.running_count(), 1);
        assert_eq!(registry.idle_count(), 1);

        registry.mark_idle(core);
        registry.mark_running(spare);
        assert_eq!(registry.running_count(), 1);
        assert_eq!(registry.idle_count(), 1);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, core);
        assert_eq!(snapshot[0].tasks_run, 1);
        assert_eq!(snapshot[1].id, spare);
        assert_eq!(snapshot[1].state, WorkerState::Running);
    }
}
