// Logging for Warmpool
//
// Pool internals emit events through the `tracing` macros; this module owns
// subscriber setup and a handful of pool-specific span and event macros.
//
// # Usage Examples
//
// ```rust
// use warmpool::logging;
//
// // INFO level, console output
// logging::init_default();
//
// // Or pick the fields yourself
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// Worker threads inherit the dispatcher that was current when the pool was
// built, so a subscriber installed with `tracing::subscriber::set_default`
// in a test also sees worker output.

use std::io;
use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the warmpool logging setup.
///
/// # Examples
///
/// ```rust
/// use warmpool::logging::LogConfig;
/// use tracing::Level;
///
/// let config = LogConfig {
///     level: Level::DEBUG,
///     json_format: true,
///     show_file_line: false,
///     show_thread_info: true,
///     show_time: true,
///     target_filters: Some("warmpool=debug,warmpool::pool::worker=trace".to_string()),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Only the first initialization takes effect
static INIT: Once = Once::new();

fn build_filter(config: &LogConfig) -> EnvFilter {
    let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    if let Some(filters) = &config.target_filters {
        for filter in filters.split(',') {
            if let Ok(directive) = filter.trim().parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }

    env_filter
}

/// Initialize the global subscriber with the given configuration.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let env_filter = build_filter(&config);
        let registry = tracing_subscriber::registry().with(env_filter);

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(
                registry.with(
                    fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_thread_names(config.show_thread_info)
                        .with_thread_ids(config.show_thread_info),
                ),
            )
        } else if config.show_time {
            Box::new(registry.with(console_layer(&config)))
        } else {
            Box::new(registry.with(console_layer(&config).without_time()))
        };

        set_global_subscriber(subscriber);
    });
}

fn console_layer<S>(config: &LogConfig) -> fmt::Layer<S>
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(atty::is(atty::Stream::Stdout))
        .with_file(config.show_file_line)
        .with_line_number(config.show_file_line)
        .with_thread_names(config.show_thread_info)
        .with_thread_ids(config.show_thread_info)
}

fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// Open `path` in append mode for use as a log writer.
pub fn file_writer(path: &str) -> io::Result<Box<dyn io::Write + Send + Sync + 'static>> {
    use std::fs::OpenOptions;

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Box::new(file))
}

/// Initialize logging to both the console and `log_file`.
///
/// The file is checked up front so a bad path is reported to the caller
/// instead of silently falling back to stderr. Fails with
/// [`io::ErrorKind::AlreadyExists`] if logging was already initialized.
pub fn init_with_file(config: LogConfig, log_file: &str) -> io::Result<()> {
    file_writer(log_file)?;

    let mut installed = false;
    INIT.call_once(|| {
        installed = true;
        let env_filter = build_filter(&config);
        let log_file_path = log_file.to_string();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(move || match file_writer(&log_file_path) {
                Ok(writer) => writer,
                Err(_) => Box::new(io::stderr()),
            })
            .with_file(true)
            .with_line_number(true)
            .with_thread_names(true)
            .with_thread_ids(true);

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer(&config))
            .with(file_layer);

        set_global_subscriber(subscriber);
    });

    if !installed {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "logging already initialized",
        ));
    }
    Ok(())
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// DEBUG for the crate, TRACE for worker internals, with file/line info.
pub fn init_development() {
    init(LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        show_time: true,
        target_filters: Some("warmpool=debug,warmpool::pool::worker=trace".to_string()),
    });
}

/// JSON lines at INFO, no source locations.
pub fn init_production() {
    init(LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    });
}

/// Warnings and errors only, compact output for test runs.
pub fn init_test() {
    init(LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    });
}

/// Span covering everything a pool does.
///
/// ```rust
/// let span = warmpool::pool_span!("3f1c...", core = 2, max = 4);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! pool_span {
    ($pool_id:expr) => {
        tracing::info_span!("pool", id = %$pool_id)
    };
    ($pool_id:expr, $($fields:tt)*) => {
        tracing::info_span!("pool", id = %$pool_id, $($fields)*)
    };
}

/// Span covering the lifetime of one worker thread.
#[macro_export]
macro_rules! worker_span {
    ($pool_id:expr, $worker_id:expr, $kind:expr) => {
        tracing::debug_span!("worker", pool = %$pool_id, id = %$worker_id, kind = ?$kind)
    };
}

/// Worker lifecycle transitions (started, retired, drained).
#[macro_export]
macro_rules! log_worker {
    ($worker_id:expr, $event:expr) => {
        tracing::debug!(worker = %$worker_id, event = $event);
    };
    ($worker_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(worker = %$worker_id, event = $event, $($fields)*);
    };
}

/// Admission decisions made by `execute`.
#[macro_export]
macro_rules! log_admission {
    ($task_id:expr, $decision:expr) => {
        tracing::trace!(task = %$task_id, decision = $decision);
    };
    ($task_id:expr, $decision:expr, $($fields:tt)*) => {
        tracing::trace!(task = %$task_id, decision = $decision, $($fields)*);
    };
}

/// Error events, with optional context fields.
#[macro_export]
macro_rules! log_error {
    ($error:expr) => {
        tracing::error!(error = %$error);
    };
    ($error:expr, $($fields:tt)*) => {
        tracing::error!(error = %$error, $($fields)*);
    };
}

/// The dispatcher current on this thread.
///
/// Pools capture it at construction and install it on every worker thread.
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}

pub use tracing::{debug, error, info, trace, warn};
