//! Data models shared by the anonymization pipeline

pub mod entity;
pub mod result;
pub mod span;

pub use entity::EntityType;
pub use result::{AnonymizationResult, BatchResult, Diagnostic, Substitution};
pub use span::Span;
