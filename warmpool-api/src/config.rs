use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default prefix for worker thread names.
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "warmpool-worker";

/// Upper bound for the default spare-maintenance interval.
pub const MAX_DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(1);

/// Lower bound for the default spare-maintenance interval.
pub const MIN_MAINTENANCE_INTERVAL: Duration = Duration::from_millis(10);

// --- Time Units ---

/// Unit in which the keep-alive amount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Convert `amount` of this unit into a [`Duration`], saturating on overflow.
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(amount),
            TimeUnit::Microseconds => Duration::from_micros(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(amount.saturating_mul(60 * 60)),
            TimeUnit::Days => Duration::from_secs(amount.saturating_mul(24 * 60 * 60)),
        }
    }
}

// --- Pool Configuration ---

/// Configuration for a bounded thread pool.
///
/// Set once at construction and never mutated afterwards. Use
/// [`PoolConfig::new`] for the positional form or start from
/// [`PoolConfig::default`] and override fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of workers that are never evicted for idleness.
    pub core_pool_size: usize,

    /// Hard upper bound on live workers.
    pub max_pool_size: usize,

    /// How long an idle overflow worker waits for work before retiring.
    pub keep_alive: Duration,

    /// Capacity of the bounded task queue.
    pub queue_capacity: usize,

    /// Number of idle workers kept warm by spare maintenance.
    pub min_spare_threads: usize,

    /// Prefix used when naming worker threads.
    pub thread_name_prefix: String,

    /// Period of the spare-maintenance pass. Derived from `keep_alive` when unset.
    pub maintenance_interval: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let cpus = num_cpus::get();
        Self {
            core_pool_size: cpus,
            max_pool_size: cpus * 2,
            keep_alive: Duration::from_secs(60),
            queue_capacity: 1024,
            min_spare_threads: 1,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            maintenance_interval: None,
        }
    }
}

impl PoolConfig {
    /// Positional constructor: core size, max size, keep-alive amount and unit,
    /// queue capacity, minimum spare threads.
    pub fn new(
        core_pool_size: usize,
        max_pool_size: usize,
        keep_alive: u64,
        unit: TimeUnit,
        queue_capacity: usize,
        min_spare_threads: usize,
    ) -> Self {
        Self {
            core_pool_size,
            max_pool_size,
            keep_alive: unit.to_duration(keep_alive),
            queue_capacity,
            min_spare_threads,
            ..Default::default()
        }
    }

    /// Override the worker thread name prefix.
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Override the spare-maintenance interval.
    pub fn with_maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = Some(interval);
        self
    }

    /// Check every construction constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_pool_size == 0 {
            return Err(ConfigError::ZeroMaxPoolSize);
        }
        if self.max_pool_size < self.core_pool_size {
            return Err(ConfigError::MaxBelowCore {
                core: self.core_pool_size,
                max: self.max_pool_size,
            });
        }
        if self.min_spare_threads > self.max_pool_size {
            return Err(ConfigError::SpareAboveMax {
                spare: self.min_spare_threads,
                max: self.max_pool_size,
            });
        }
        if self.thread_name_prefix.as_bytes().contains(&0) {
            return Err(ConfigError::InvalidThreadName(self.thread_name_prefix.clone()));
        }
        if self.maintenance_interval == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroMaintenanceInterval);
        }
        Ok(())
    }

    /// Effective period of the spare-maintenance pass.
    ///
    /// Never longer than `keep_alive` unless `keep_alive` is zero.
    pub fn effective_maintenance_interval(&self) -> Duration {
        let interval = self.maintenance_interval.unwrap_or_else(|| {
            self.keep_alive
                .min(MAX_DEFAULT_MAINTENANCE_INTERVAL)
                .max(MIN_MAINTENANCE_INTERVAL)
        });
        if self.keep_alive.is_zero() {
            interval
        } else {
            interval.min(self.keep_alive)
        }
    }

    /// How long a spare that refused to retire waits before re-checking.
    pub fn idle_recheck_interval(&self) -> Duration {
        self.keep_alive.max(MIN_MAINTENANCE_INTERVAL)
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }
}
