//! Consistent PII pseudonymization
//!
//! Detects sensitive spans in free text and replaces them with synthetic
//! substitutes. The same original value always maps to the same substitute,
//! across requests and processes, through the mapping store.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! - **Detection**: pattern recognizers with context boosting, name and place
//!   lexicons, an optional external recognizer, and the span merger
//! - **Mapping store**: fingerprint → substitute with usage counters
//! - **Generation**: type- and origin-aware synthetic values
//! - **Operators**: mask, hash and redact strategies for per-type overrides
//! - **Audit**: one record per operation, without values
//!
//! # Usage
//!
//! ```rust,no_run
//! use masquerade::anonymization::{AnonymizationConfig, AnonymizationEngine, AnonymizationOptions};
//! use masquerade::anonymization::store::MappingStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default(), MappingStore::in_memory())?;
//! let result = engine
//!     .anonymize("Reach me at jane@example.com", &AnonymizationOptions::default())
//!     .await?;
//! assert!(!result.anonymized_text.contains("jane@example.com"));
//! # Ok(())
//! # }
//! ```

pub mod anonymizer;
pub mod audit;
pub mod config;
pub mod detector;
pub mod engine;
pub mod generator;
pub mod models;
pub mod store;

// Re-export main types
pub use config::{AnonymizationConfig, StrategyConfig};
pub use engine::{AnonymizationEngine, AnonymizationOptions, EntityTypeInfo};
pub use models::{AnonymizationResult, BatchResult, Diagnostic, EntityType, Span, Substitution};
pub use store::{Mapping, MappingStore};
