//! # Executor Error Types
//!
//! Errors surfaced by the executor API. Admission failures are returned to
//! the caller of `execute` immediately and are never retried internally;
//! retry policy belongs to the caller.
//!
//! ## Core Components
//!
//! - `ExecuteError`: why a task was not accepted
//! - `RejectionReason`: the capacity condition behind a rejection
//! - `TaskError`: how a task body failed after acceptance
//! - `ConfigError`: an invalid pool configuration

use std::fmt;

use thiserror::Error;

/// Why a pool refused a task while it was still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The queue is full and the worker count is at `max_pool_size`.
    QueueFullAndMaxReached,

    /// A worker slot was reserved but the OS refused to start the thread.
    WorkerSpawnFailed,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::QueueFullAndMaxReached => {
                f.write_str("queue full and maximum pool size reached")
            }
            RejectionReason::WorkerSpawnFailed => f.write_str("worker thread could not be spawned"),
        }
    }
}

/// Admission error returned by `execute`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    /// The pool is running but has no room for the task.
    #[error("Task rejected: {reason}")]
    Rejected { reason: RejectionReason },

    /// The pool has been shut down.
    #[error("Pool is closed")]
    PoolClosed,
}

impl ExecuteError {
    /// Rejection caused by a full queue at maximum pool size.
    pub fn queue_full() -> Self {
        ExecuteError::Rejected {
            reason: RejectionReason::QueueFullAndMaxReached,
        }
    }

    /// Whether this error is a capacity rejection (as opposed to a closed pool).
    pub fn is_rejection(&self) -> bool {
        matches!(self, ExecuteError::Rejected { .. })
    }
}

/// Failure of a task body, isolated at the worker boundary.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("Task failed: {0}")]
    Failed(#[from] anyhow::Error),
}

/// Invalid pool configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_pool_size must be greater than zero")]
    ZeroMaxPoolSize,
    #[error("max_pool_size ({max}) is smaller than core_pool_size ({core})")]
    MaxBelowCore { core: usize, max: usize },
    #[error("min_spare_threads ({spare}) exceeds max_pool_size ({max})")]
    SpareAboveMax { spare: usize, max: usize },
    #[error("Thread name prefix contains a null byte: {0:?}")]
    InvalidThreadName(String),
    #[error("maintenance_interval must be greater than zero")]
    ZeroMaintenanceInterval,
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Failed to read configuration: {0}")]
    Read(String),
}
