// Masquerade - Consistent PII Pseudonymization
// Copyright (c) 2025 Masquerade Contributors
// Licensed under the MIT License

//! # Masquerade - Consistent PII Pseudonymization
//!
//! Masquerade finds personally identifiable information in free text and
//! replaces each value with a realistic synthetic substitute. The same
//! original value always receives the same substitute, within a text,
//! across requests and across process restarts, so anonymized data keeps
//! its referential structure.
//!
//! ## Architecture
//!
//! - [`anonymization`] - detection, span merging, the mapping store,
//!   synthetic generation and the orchestrating engine
//! - [`adapters`] - mapping store backends (PostgreSQL) and their factory
//! - [`domain`] - error types
//! - [`config`] - configuration management
//! - [`logging`] - structured logging
//! - [`cli`] - command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use masquerade::anonymization::{AnonymizationConfig, AnonymizationEngine, AnonymizationOptions};
//! use masquerade::anonymization::store::MappingStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = AnonymizationEngine::new(AnonymizationConfig::default(), MappingStore::in_memory())?;
//!
//!     let text = "Contact John Smith at 555-123-4567 or john@example.com";
//!     let first = engine.anonymize(text, &AnonymizationOptions::default()).await?;
//!     let second = engine.anonymize(text, &AnonymizationOptions::default()).await?;
//!
//!     // Consistent: the same input yields the same output
//!     assert_eq!(first.anonymized_text, second.anonymized_text);
//!     println!("{}", first.anonymized_text);
//!     Ok(())
//! }
//! ```
//!
//! ## Durable Mappings
//!
//! With the PostgreSQL backend, substitutes survive restarts and are shared
//! by every process pointing at the same database:
//!
//! ```rust,no_run
//! use masquerade::adapters::database::create_mapping_store;
//! use masquerade::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("masquerade.toml")?;
//! let store = create_mapping_store(&config.store).await?;
//! println!("{} mappings stored", store.count().await?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`domain::MasqueradeError`]. Only invalid input
//! and store failures abort a request; recognizer, generator and audit
//! failures are reported as [`anonymization::Diagnostic`]s on the result.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
