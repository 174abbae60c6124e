//! Per-request result models

use super::EntityType;
use serde::Serialize;

/// A single replacement applied to the input text
///
/// `start`/`end` always refer to the original input, never to the rewritten
/// text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub start: usize,
    pub end: usize,
    pub entity_type: EntityType,
    pub original_length: usize,
    pub substitute: String,
    /// Whether this substitution created a new mapping
    pub created: bool,
}

/// Non-fatal condition recorded while processing a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A recognizer failed and its spans were dropped
    RecognizerFailure { recognizer: String, message: String },
    /// A generator could not honor the type's rules and used the generic placeholder
    GenerationFallback { entity_type: EntityType, reason: String },
    /// The audit sink rejected the operation record
    AuditFailure { message: String },
}

/// Outcome of anonymizing one text
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizationResult {
    pub anonymized_text: String,
    pub substitutions: Vec<Substitution>,
    pub entities_detected: usize,
    pub entities_anonymized: usize,
    pub new_mappings_created: usize,
    pub existing_mappings_used: usize,
    pub processing_time_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl AnonymizationResult {
    /// Result for a text in which nothing was detected
    pub fn unchanged(text: &str, processing_time_ms: u64, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            anonymized_text: text.to_string(),
            substitutions: Vec::new(),
            entities_detected: 0,
            entities_anonymized: 0,
            new_mappings_created: 0,
            existing_mappings_used: 0,
            processing_time_ms,
            diagnostics,
        }
    }

    /// Distinct entity types that were substituted, sorted
    pub fn entity_types(&self) -> Vec<EntityType> {
        let mut types: Vec<EntityType> = self
            .substitutions
            .iter()
            .map(|s| s.entity_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

/// Outcome of anonymizing a batch of texts
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    /// Per-text results, in input order
    pub results: Vec<AnonymizationResult>,
    pub total_entities_detected: usize,
    pub total_entities_anonymized: usize,
    pub total_processing_time_ms: u64,
    /// True when a shutdown signal stopped the batch before every text was processed
    pub interrupted: bool,
}
