//! Regex-based span recognizer

use super::context::ContextKeywords;
use super::patterns::{CompiledPattern, CompiledRecognizer};
use super::{resolve_overlaps, SpanRecognizer};
use crate::anonymization::models::{EntityType, Span};
use anyhow::{Context, Result};

/// Recognizer built from one pattern library entry
///
/// Runs every rule over the text, applies the context boost and checksum
/// validators, then resolves overlaps between its own rules so that at most
/// one span covers any byte.
pub struct PatternRecognizer {
    id: String,
    entity_type: EntityType,
    patterns: Vec<CompiledPattern>,
    context: ContextKeywords,
}

impl PatternRecognizer {
    pub fn new(compiled: CompiledRecognizer) -> Self {
        Self {
            context: ContextKeywords::new(&compiled.context),
            id: compiled.id,
            entity_type: compiled.entity_type,
            patterns: compiled.patterns,
        }
    }

    fn candidates(&self, text: &str) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for pattern in &self.patterns {
            for found in pattern.regex.find_iter(text) {
                let matched = found.with_context(|| {
                    format!("Pattern '{}' failed while matching", pattern.name)
                })?;

                let score = match pattern.validator {
                    Some(validator) if !validator.validate(matched.as_str()) => continue,
                    Some(_) => 1.0,
                    None => self.context.boosted_score(
                        text,
                        matched.start(),
                        matched.end(),
                        pattern.score,
                    ),
                };

                if let Some(span) = Span::new(
                    matched.start(),
                    matched.end(),
                    self.entity_type.clone(),
                    score,
                    self.id.as_str(),
                ) {
                    spans.push(span);
                }
            }
        }

        Ok(spans)
    }
}

impl SpanRecognizer for PatternRecognizer {
    fn id(&self) -> &str {
        &self.id
    }

    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn find(&self, text: &str) -> Result<Vec<Span>> {
        Ok(resolve_overlaps(self.candidates(text)?))
    }
}
