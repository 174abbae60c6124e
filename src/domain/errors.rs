//! Domain error types
//!
//! This module defines the error hierarchy for Masquerade. Errors are
//! domain-specific and don't expose third-party types: driver and pool
//! failures are flattened into strings at the adapter boundary.
//!
//! Only two kinds of failure ever reach a caller of the anonymization
//! pipeline: [`MasqueradeError::InvalidInput`] (rejected before detection)
//! and [`MasqueradeError::StoreUnavailable`] (no consistent substitution is
//! possible). Recognizer and generator failures degrade to diagnostics.

use thiserror::Error;

/// Main Masquerade error type
#[derive(Debug, Error)]
pub enum MasqueradeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request rejected before any processing took place
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    /// Mapping store cannot be reached or is in an unusable state
    #[error("Mapping store unavailable: {0}")]
    StoreUnavailable(String),

    /// Database statement failed on a reachable store
    #[error("Database error: {0}")]
    Database(String),

    /// Requested mapping does not exist
    #[error("Mapping not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl MasqueradeError {
    /// Whether the error originates from the mapping store
    ///
    /// Store failures are fatal for a request because consistency cannot be
    /// guaranteed without the store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::Database(_))
    }
}

/// Input validation errors
///
/// Raised before detection runs; no partial processing happens when one of
/// these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// Text is empty
    #[error("text must not be empty")]
    EmptyText,

    /// Text exceeds the configured maximum length
    #[error("text length {len} exceeds maximum of {max}")]
    TextTooLong { len: usize, max: usize },

    /// An entity type was requested that no recognizer supports
    #[error("unsupported entity type: {0}")]
    UnsupportedEntityType(String),

    /// Confidence threshold outside [0, 1]
    #[error("confidence threshold {0} must be between 0.0 and 1.0")]
    ThresholdOutOfRange(f32),

    /// Batch contains no texts
    #[error("batch must contain at least one text")]
    EmptyBatch,

    /// Batch exceeds the configured maximum size
    #[error("batch size {len} exceeds maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// A text inside a batch failed validation
    #[error("batch item {index}: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<InputError>,
    },

    /// Substitute override is empty or too long
    #[error("substitute must be between 1 and {max} characters")]
    InvalidSubstitute { max: usize },
}

impl From<std::io::Error> for MasqueradeError {
    fn from(err: std::io::Error) -> Self {
        MasqueradeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MasqueradeError {
    fn from(err: serde_json::Error) -> Self {
        MasqueradeError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MasqueradeError {
    fn from(err: toml::de::Error) -> Self {
        MasqueradeError::Configuration(err.to_string())
    }
}
