use warmpool_api::errors::{ConfigError, ExecuteError, RejectionReason, TaskError};
use std::error::Error;
use anyhow::anyhow;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let error = ExecuteError::queue_full();

        assert_eq!(
            error.to_string(),
            "Task rejected: queue full and maximum pool size reached"
        );
        assert!(error.is_rejection());
        assert!(error.source().is_none());
    }

    #[test]
    fn test_spawn_failure_rejection() {
        let error = ExecuteError::Rejected { reason: RejectionReason::WorkerSpawnFailed };

        assert_eq!(error.to_string(), "Task rejected: worker thread could not be spawned");
        assert!(error.is_rejection());
    }

    #[test]
    fn test_pool_closed() {
        let error = ExecuteError::PoolClosed;

        assert_eq!(error.to_string(), "Pool is closed");
        assert!(!error.is_rejection());
        assert_ne!(error, ExecuteError::queue_full());
    }

    #[test]
    fn test_task_error_display() {
        assert_eq!(
            TaskError::Panicked("index out of bounds".to_string()).to_string(),
            "Task panicked: index out of bounds"
        );

        let failed: TaskError = anyhow!("disk unavailable").into();
        assert_eq!(failed.to_string(), "Task failed: disk unavailable");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::ZeroMaxPoolSize.to_string(),
            "max_pool_size must be greater than zero"
        );
        assert_eq!(
            ConfigError::MaxBelowCore { core: 4, max: 2 }.to_string(),
            "max_pool_size (2) is smaller than core_pool_size (4)"
        );
        assert_eq!(
            ConfigError::SpareAboveMax { spare: 5, max: 4 }.to_string(),
            "min_spare_threads (5) exceeds max_pool_size (4)"
        );
        assert_eq!(
            ConfigError::Parse("expected value".to_string()).to_string(),
            "Failed to parse configuration: expected value"
        );
    }
}
