//! PostgreSQL mapping store
//!
//! Pooled client plus the [`MappingRepository`](crate::anonymization::store::MappingRepository)
//! implementation over the `pii_mappings` table.

pub mod client;
pub mod repository;

pub use client::PostgreSQLClient;
pub use repository::PostgreSQLMappingRepository;
