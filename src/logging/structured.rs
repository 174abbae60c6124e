//! Structured logging setup using tracing
//!
//! Console output always; JSON lines to a rolling file when
//! `logging.local_enabled` is set.

use crate::config::LoggingConfig;
use crate::domain::{MasqueradeError, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "masquerade";
const LOG_FILE_SUFFIX: &str = "log";

/// Keeps the non-blocking file writer alive; drop it last to flush logs
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self {
            _file_guard: file_guard,
        }
    }

    /// Whether a file writer is attached
    pub fn has_file_output(&self) -> bool {
        self._file_guard.is_some()
    }
}

/// Initialize the global subscriber
///
/// `RUST_LOG`, when set, takes precedence over `log_level_str`. Can only
/// succeed once per process.
///
/// # Errors
///
/// Returns [`MasqueradeError::Configuration`] for an unknown level, an
/// uncreatable log directory or an already-installed subscriber.
///
/// # Example
///
/// ```no_run
/// use masquerade::logging::init_logging;
/// use masquerade::config::LoggingConfig;
///
/// let config = LoggingConfig::default();
/// let _guard = init_logging("info", &config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("masquerade={log_level}")));

    let mut layers = Vec::new();

    // Console goes to stderr so `anonymize` output on stdout stays clean
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());
    layers.push(console_layer.boxed());

    let file_guard = if config.local_enabled {
        let appender = build_file_appender(config)?;
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(non_blocking)
            .with_filter(env_filter);

        layers.push(file_layer.boxed());
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| {
            MasqueradeError::Configuration(format!("Failed to install log subscriber: {e}"))
        })?;

    tracing::debug!(
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

fn build_file_appender(config: &LoggingConfig) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        MasqueradeError::Configuration(format!(
            "Failed to create log directory {}: {}",
            config.local_path, e
        ))
    })?;

    let mut builder = RollingFileAppender::builder()
        .rotation(parse_rotation(&config.local_rotation))
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX);
    if config.local_max_files > 0 {
        builder = builder.max_log_files(config.local_max_files);
    }

    builder.build(&config.local_path).map_err(|e| {
        MasqueradeError::Configuration(format!(
            "Failed to open log file in {}: {}",
            config.local_path, e
        ))
    })
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(MasqueradeError::Configuration(format!(
            "Invalid log level: {level_str}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}
