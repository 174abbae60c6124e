//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output on stderr
//! - JSON-formatted rolling file logs
//! - level from configuration, `--log-level` or `RUST_LOG`
//!
//! Original values and their substitutes never appear in log fields; only
//! entity types, counts and lengths do.
//!
//! # Example
//!
//! ```no_run
//! use masquerade::logging::init_logging;
//! use masquerade::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(entities = 3, "Text anonymized");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the completion of an anonymization request
///
/// # Example
///
/// ```no_run
/// use masquerade::log_anonymization_complete;
/// use std::time::Duration;
///
/// log_anonymization_complete!(42, 3, 2, Duration::from_millis(12));
/// ```
#[macro_export]
macro_rules! log_anonymization_complete {
    ($input_length:expr, $detected:expr, $anonymized:expr, $duration:expr) => {
        tracing::info!(
            input_length = $input_length,
            entities_detected = $detected,
            entities_anonymized = $anonymized,
            duration_ms = $duration.as_millis() as u64,
            "Anonymization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use masquerade::log_error_with_context;
/// use masquerade::domain::MasqueradeError;
///
/// let error = MasqueradeError::StoreUnavailable("pool timed out".to_string());
/// log_error_with_context!(&error, "Failed to resolve substitute");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log batch progress
///
/// # Example
///
/// ```no_run
/// use masquerade::log_batch_progress;
///
/// log_batch_progress!(10, 100);
/// ```
#[macro_export]
macro_rules! log_batch_progress {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::MasqueradeError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_anonymization_complete!(10usize, 1usize, 1usize, Duration::from_millis(5));
        log_error_with_context!(
            &MasqueradeError::Other("boom".to_string()),
            "unit test"
        );
        log_batch_progress!(1usize, 4usize);
    }
}
