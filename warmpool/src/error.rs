use thiserror::Error;

use warmpool_api::ConfigError;

/// Errors raised while building or tearing down a pool.
///
/// Admission failures are not here; `execute` reports those as
/// [`warmpool_api::ExecuteError`].
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Thread setup error: {0}")]
    ThreadSpawn(String),
    #[error("Internal pool error: {0}")]
    Other(#[from] anyhow::Error),
}
