#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use warmpool::{PoolListener, RejectionReason, TaskError, TaskId, WorkerId, WorkerKind};

/// Upper bound for any condition a test waits on.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// A latch that holds tasks until the test opens it.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn wait(&self) {
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.opened.wait(open).unwrap();
        }
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Listener that counts events and tracks the peak number of live workers.
#[derive(Default)]
pub struct CountingListener {
    pub live_workers: AtomicUsize,
    pub peak_workers: AtomicUsize,
    pub started: AtomicUsize,
    pub terminated: AtomicUsize,
    pub completed: AtomicUsize,
    pub failed: AtomicUsize,
    pub panicked: AtomicUsize,
    pub rejected: AtomicUsize,
}

impl CountingListener {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl PoolListener for CountingListener {
    fn on_worker_started(&self, _worker: WorkerId, _kind: WorkerKind) {
        self.started.fetch_add(1, Ordering::SeqCst);
        let live = self.live_workers.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_workers.fetch_max(live, Ordering::SeqCst);
    }

    fn on_worker_terminated(&self, _worker: WorkerId, _kind: WorkerKind) {
        self.terminated.fetch_add(1, Ordering::SeqCst);
        self.live_workers.fetch_sub(1, Ordering::SeqCst);
    }

    fn on_task_completed(&self, _task: TaskId, _elapsed: Duration) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_task_failed(&self, _task: TaskId, error: &TaskError) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        if matches!(error, TaskError::Panicked(_)) {
            self.panicked.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_task_rejected(&self, _task: TaskId, _reason: RejectionReason) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }
}
