//! Span detection
//!
//! A [`RecognizerSet`] runs every builtin [`SpanRecognizer`] plus an optional
//! [`ExternalRecognizer`] over a text and hands the pooled candidates to the
//! [`merger`]. Recognizers are independent and pure; a failing recognizer
//! only loses its own spans.

pub mod context;
pub mod lexicon;
pub mod merger;
pub mod patterns;
pub mod regex;

use crate::anonymization::models::{Diagnostic, EntityType, Span};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

pub use lexicon::{PersonNameRecognizer, PlaceNameRecognizer};
pub use merger::merge;
pub use patterns::PatternRegistry;
pub use regex::PatternRecognizer;

/// Synchronous span finder for a single entity type
pub trait SpanRecognizer: Send + Sync {
    /// Stable recognizer identifier, reported as the span source
    fn id(&self) -> &str;

    /// Entity type this recognizer emits
    fn entity_type(&self) -> &EntityType;

    /// Find candidate spans, sorted by start and non-overlapping
    fn find(&self, text: &str) -> Result<Vec<Span>>;
}

/// Pluggable recognizer backed by an external model or service
#[async_trait]
pub trait ExternalRecognizer: Send + Sync {
    fn id(&self) -> &str;

    /// Entity types the recognizer can emit
    fn supported_types(&self) -> Vec<EntityType>;

    /// Analyze text for the requested entity types
    async fn analyze(
        &self,
        text: &str,
        requested_types: &[EntityType],
        language: &str,
    ) -> Result<Vec<Span>>;
}

/// Candidate spans from every source, before merging
#[derive(Debug, Default)]
pub struct Detection {
    pub spans: Vec<Span>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Collection of recognizers consulted for each request
#[derive(Clone)]
pub struct RecognizerSet {
    recognizers: Vec<Arc<dyn SpanRecognizer>>,
    external: Option<Arc<dyn ExternalRecognizer>>,
}

impl RecognizerSet {
    pub fn new(recognizers: Vec<Arc<dyn SpanRecognizer>>) -> Self {
        Self {
            recognizers,
            external: None,
        }
    }

    /// Builtin set: one recognizer per pattern library entry plus the name
    /// and place lexicons
    pub fn builtin(registry: &PatternRegistry) -> Self {
        let mut recognizers: Vec<Arc<dyn SpanRecognizer>> = registry
            .recognizers()
            .iter()
            .cloned()
            .map(|compiled| Arc::new(PatternRecognizer::new(compiled)) as Arc<dyn SpanRecognizer>)
            .collect();
        recognizers.push(Arc::new(PersonNameRecognizer::new()));
        recognizers.push(Arc::new(PlaceNameRecognizer::new()));

        Self::new(recognizers)
    }

    /// Attach an external recognizer
    pub fn with_external(mut self, external: Arc<dyn ExternalRecognizer>) -> Self {
        self.external = Some(external);
        self
    }

    /// Entity types at least one recognizer can emit
    pub fn supported_types(&self) -> BTreeSet<EntityType> {
        let mut types: BTreeSet<EntityType> = self
            .recognizers
            .iter()
            .map(|r| r.entity_type().clone())
            .collect();
        if let Some(external) = &self.external {
            types.extend(external.supported_types());
        }
        types
    }

    /// Run the recognizers restricted to `requested` (all when `None`)
    ///
    /// Recognizer errors are logged and recorded as diagnostics; the
    /// remaining recognizers still contribute.
    pub async fn detect(
        &self,
        text: &str,
        requested: Option<&HashSet<EntityType>>,
        language: &str,
    ) -> Detection {
        let mut detection = Detection::default();
        let wanted = |entity_type: &EntityType| requested.map_or(true, |r| r.contains(entity_type));

        for recognizer in self
            .recognizers
            .iter()
            .filter(|r| wanted(r.entity_type()))
        {
            match recognizer.find(text) {
                Ok(spans) => detection.spans.extend(spans),
                Err(e) => {
                    tracing::warn!(
                        recognizer = recognizer.id(),
                        error = %e,
                        "Recognizer failed, dropping its spans"
                    );
                    detection.diagnostics.push(Diagnostic::RecognizerFailure {
                        recognizer: recognizer.id().to_string(),
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        if let Some(external) = &self.external {
            let types: Vec<EntityType> = external
                .supported_types()
                .into_iter()
                .filter(|t| wanted(t))
                .collect();

            if !types.is_empty() {
                match external.analyze(text, &types, language).await {
                    Ok(spans) => detection.spans.extend(
                        spans
                            .into_iter()
                            .filter(|s| s.end() <= text.len() && wanted(s.entity_type())),
                    ),
                    Err(e) => {
                        tracing::warn!(
                            recognizer = external.id(),
                            error = %e,
                            "External recognizer failed, dropping its spans"
                        );
                        detection.diagnostics.push(Diagnostic::RecognizerFailure {
                            recognizer: external.id().to_string(),
                            message: format!("{e:#}"),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            candidates = detection.spans.len(),
            failures = detection.diagnostics.len(),
            "Detection complete"
        );

        detection
    }
}

/// Resolve overlaps between spans of a single recognizer
///
/// Higher score wins, then the longer match, then the earlier start. The
/// result is sorted by start.
pub(crate) fn resolve_overlaps(mut candidates: Vec<Span>) -> Vec<Span> {
    candidates.sort_by(|a, b| {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.start().cmp(&b.start()))
    });

    let mut kept: Vec<Span> = Vec::with_capacity(candidates.len());
    for span in candidates {
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }

    kept.sort_by_key(|s| s.start());
    kept
}
