//! # Warmpool Executor API
//!
//! The abstract surface of a bounded, self-scaling thread-pool executor. An
//! implementation accepts zero-argument tasks, runs them on a managed set of
//! worker threads whose count floats between a core minimum and a hard
//! maximum, keeps a few idle threads warm for low-latency dispatch, and
//! rejects work it cannot accept.
//!
//! ## Core Components
//!
//! - **Configuration**: immutable pool parameters fixed at construction
//! - **Tasks**: opaque units of work, infallible or fallible
//! - **Executor**: the admission and shutdown contract
//! - **Listener**: an observer injected at construction for bookkeeping
//! - **Errors**: rejection, closed-pool and configuration errors
//!
//! ## Usage Example
//!
//! ```rust
//! use warmpool_api::{ExecuteError, Executor};
//!
//! fn submit_all<E: Executor>(executor: &E, count: usize) -> usize {
//!     let mut rejected = 0;
//!     for _ in 0..count {
//!         match executor.execute(|| {}) {
//!             Ok(()) => {}
//!             Err(ExecuteError::Rejected { .. }) => rejected += 1,
//!             Err(ExecuteError::PoolClosed) => break,
//!         }
//!     }
//!     rejected
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`config`]: Pool configuration and time units
//! - [`task`]: The task type handed to executors
//! - [`executor`]: The executor trait
//! - [`observer`]: Lifecycle listener trait
//! - [`errors`]: Error types
//! - [`types`]: Lifecycle enums shared by implementations

pub mod config;
pub mod errors;
pub mod executor;
pub mod observer;
pub mod task;
pub mod types;

pub use config::{PoolConfig, TimeUnit};
pub use errors::{ConfigError, ExecuteError, RejectionReason, TaskError};
pub use executor::Executor;
pub use observer::{NoopListener, PoolListener};
pub use task::{Task, TaskId};
pub use types::{PoolState, WorkerId, WorkerKind, WorkerState};
