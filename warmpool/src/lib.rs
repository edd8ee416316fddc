//! # Warmpool
//!
//! A bounded thread pool that grows from `core_pool_size` up to
//! `max_pool_size` under load, lets overflow threads go after `keep_alive`
//! of idleness, keeps `min_spare_threads` idle threads warm, and rejects
//! what it cannot queue.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use warmpool::{PoolConfig, ThreadPool, TimeUnit};
//!
//! let config = PoolConfig::new(2, 4, 5, TimeUnit::Seconds, 8, 1);
//! let pool = ThreadPool::new(config).unwrap();
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! for _ in 0..10 {
//!     let counter = Arc::clone(&counter);
//!     pool.execute(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//! }
//!
//! pool.shutdown();
//! pool.await_termination().unwrap();
//! assert_eq!(counter.load(Ordering::SeqCst), 10);
//! ```

pub mod error;
pub mod logging;
pub mod pool;

pub use error::PoolError;
pub use pool::{PoolMetrics, ThreadPool, WorkerSnapshot};
pub use warmpool_api::{
    ConfigError, ExecuteError, Executor, NoopListener, PoolConfig, PoolListener, PoolState,
    RejectionReason, Task, TaskError, TaskId, TimeUnit, WorkerId, WorkerKind, WorkerState,
};
