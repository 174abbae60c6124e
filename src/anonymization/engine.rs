//! Main anonymization engine
//!
//! [`AnonymizationEngine`] drives one request through
//! detect → lookup-or-create → rewrite → report:
//!
//! - **Detect**: the recognizer set (built-in patterns, name lexicons and an
//!   optional external recognizer) proposes spans; the merger keeps the
//!   non-overlapping, above-threshold ones.
//! - **Resolve**: each span gets a substitute from its type's strategy.
//!   Consistent replacement goes through the mapping store; spans are
//!   resolved concurrently up to `span_concurrency`.
//! - **Rewrite**: substitutions are applied right to left so the reported
//!   positions always refer to the input text.
//! - **Report**: counts, timings and diagnostics are returned and one audit
//!   event is recorded.
//!
//! # Examples
//!
//! ```no_run
//! use masquerade::anonymization::{AnonymizationConfig, AnonymizationEngine, AnonymizationOptions};
//! use masquerade::anonymization::store::MappingStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default(), MappingStore::in_memory())?;
//!
//! let result = engine
//!     .anonymize("Contact John Smith at 555-123-4567", &AnonymizationOptions::default())
//!     .await?;
//! println!("{}", result.anonymized_text);
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    anonymizer::{operator_for, Operator},
    audit::{AuditEvent, AuditSink, FileAuditSink, OperationKind},
    config::AnonymizationConfig,
    detector::{merge, ExternalRecognizer, PatternRegistry, RecognizerSet},
    generator::SyntheticGenerator,
    models::{AnonymizationResult, BatchResult, Diagnostic, EntityType, Span, Substitution},
    store::MappingStore,
};
use crate::domain::{InputError, MasqueradeError, Result};
use anyhow::Context;
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Per-request overrides
#[derive(Debug, Clone, Default)]
pub struct AnonymizationOptions {
    /// Entity types to detect; the configured enabled types when `None`
    pub entity_types: Option<Vec<EntityType>>,
    /// Minimum span score; the configured threshold when `None`
    pub confidence_threshold: Option<f32>,
}

/// Supported entity type with its description
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EntityTypeInfo {
    pub entity_type: EntityType,
    pub description: String,
    pub enabled: bool,
    pub strategy: &'static str,
}

/// Substitute chosen for one span
struct Resolution {
    substitution: Substitution,
    /// `Some(true)` new mapping, `Some(false)` reused, `None` local operator
    mapping_created: Option<bool>,
    fallback: Option<String>,
}

/// Anonymization orchestrator
///
/// Stateless per call; share it across tasks with `Arc`. The mapping store
/// is the only shared mutable resource.
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    recognizers: RecognizerSet,
    generator: SyntheticGenerator,
    store: MappingStore,
    operators: HashMap<EntityType, Arc<dyn Operator>>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl AnonymizationEngine {
    /// Create a new anonymization engine
    ///
    /// Loads the pattern library (the configured file, or the built-in
    /// one), builds the strategy operators and opens the audit sink when
    /// auditing is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the pattern library
    /// cannot be loaded or the audit log cannot be opened.
    pub fn new(config: AnonymizationConfig, store: MappingStore) -> anyhow::Result<Self> {
        config
            .validate()
            .context("Invalid anonymization configuration")?;

        let registry = match config.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path)?,
            None => PatternRegistry::default_patterns()?,
        };
        let recognizers = RecognizerSet::builtin(&registry);

        let operators = config
            .strategies
            .iter()
            .filter_map(|(entity_type, strategy)| {
                operator_for(strategy).map(|op| (entity_type.clone(), op))
            })
            .collect();

        let audit = FileAuditSink::from_config(&config.audit)?
            .map(|sink| Arc::new(sink) as Arc<dyn AuditSink>);

        tracing::info!(
            recognizers = registry.recognizers().len(),
            backend = store.backend(),
            locale = %config.locale,
            threshold = config.confidence_threshold,
            "Anonymization engine initialized"
        );

        Ok(Self {
            generator: SyntheticGenerator::new(config.generator_locale()),
            config,
            recognizers,
            store,
            operators,
            audit,
        })
    }

    /// Replace the recognizer set
    pub fn with_recognizers(mut self, recognizers: RecognizerSet) -> Self {
        self.recognizers = recognizers;
        self
    }

    /// Add an external recognizer alongside the built-in ones
    pub fn with_external_recognizer(mut self, external: Arc<dyn ExternalRecognizer>) -> Self {
        self.recognizers = self.recognizers.with_external(external);
        self
    }

    /// Replace the audit sink (`None` disables auditing)
    pub fn with_audit_sink(mut self, sink: Option<Arc<dyn AuditSink>>) -> Self {
        self.audit = sink;
        self
    }

    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Entity types at least one recognizer can detect
    pub fn supported_entity_types(&self) -> Vec<EntityTypeInfo> {
        let enabled: HashSet<&EntityType> = self.config.enabled_entity_types.iter().collect();
        self.recognizers
            .supported_types()
            .into_iter()
            .map(|entity_type| EntityTypeInfo {
                description: entity_type.description().to_string(),
                enabled: enabled.contains(&entity_type),
                strategy: self.config.strategy_for(&entity_type).name(),
                entity_type,
            })
            .collect()
    }

    /// Anonymize a single text
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the request is rejected before detection;
    /// `StoreUnavailable`/`Database` when a consistent substitute cannot be
    /// resolved. Recognizer, generator and audit failures are reported as
    /// diagnostics instead.
    pub async fn anonymize(
        &self,
        text: &str,
        options: &AnonymizationOptions,
    ) -> Result<AnonymizationResult> {
        let (requested, threshold) = self.request_parameters(options)?;
        self.validate_text(text)?;

        let mut result = self.process(text, &requested, threshold).await?;

        let event = AuditEvent {
            timestamp: Utc::now(),
            operation: OperationKind::Anonymize,
            entity_types: result.entity_types(),
            input_length: text.len(),
            entities_detected: result.entities_detected,
            entities_anonymized: result.entities_anonymized,
            new_mappings_created: result.new_mappings_created,
            duration_ms: result.processing_time_ms,
            batch_size: None,
        };
        if let Some(diagnostic) = self.audit(&event) {
            result.diagnostics.push(diagnostic);
        }

        crate::log_anonymization_complete!(
            text.len(),
            result.entities_detected,
            result.entities_anonymized,
            Duration::from_millis(result.processing_time_ms)
        );
        Ok(result)
    }

    /// Anonymize several texts independently
    ///
    /// When `shutdown` flips to `true` the batch stops before the next text;
    /// texts already processed are returned with `interrupted` set. One
    /// `batch_anonymize` audit event covers the whole batch.
    pub async fn anonymize_batch(
        &self,
        texts: &[String],
        options: &AnonymizationOptions,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<BatchResult> {
        let (requested, threshold) = self.request_parameters(options)?;

        if texts.is_empty() {
            return Err(InputError::EmptyBatch.into());
        }
        if texts.len() > self.config.max_batch_size {
            return Err(InputError::BatchTooLarge {
                len: texts.len(),
                max: self.config.max_batch_size,
            }
            .into());
        }
        for (index, text) in texts.iter().enumerate() {
            self.check_text(text).map_err(|source| InputError::BatchItem {
                index,
                source: Box::new(source),
            })?;
        }

        let start = Instant::now();
        let mut results = Vec::with_capacity(texts.len());
        let mut interrupted = false;

        for (index, text) in texts.iter().enumerate() {
            crate::log_batch_progress!(index + 1, texts.len());
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                tracing::warn!(
                    processed = results.len(),
                    remaining = texts.len() - results.len(),
                    "Shutdown requested, stopping batch"
                );
                interrupted = true;
                break;
            }
            results.push(self.process(text, &requested, threshold).await?);
        }

        let batch = BatchResult {
            total_entities_detected: results.iter().map(|r| r.entities_detected).sum(),
            total_entities_anonymized: results.iter().map(|r| r.entities_anonymized).sum(),
            total_processing_time_ms: elapsed_ms(start),
            interrupted,
            results,
        };

        let entity_types: BTreeSet<EntityType> = batch
            .results
            .iter()
            .flat_map(|r| r.entity_types())
            .collect();
        let event = AuditEvent {
            timestamp: Utc::now(),
            operation: OperationKind::BatchAnonymize,
            entity_types: entity_types.into_iter().collect(),
            input_length: texts[..batch.results.len()].iter().map(String::len).sum(),
            entities_detected: batch.total_entities_detected,
            entities_anonymized: batch.total_entities_anonymized,
            new_mappings_created: batch.results.iter().map(|r| r.new_mappings_created).sum(),
            duration_ms: batch.total_processing_time_ms,
            batch_size: Some(batch.results.len()),
        };
        // Batch-level audit failures are logged only; there is no single result to attach them to
        self.audit(&event);

        tracing::info!(
            texts = batch.results.len(),
            entities = batch.total_entities_anonymized,
            duration_ms = batch.total_processing_time_ms,
            interrupted,
            "Batch anonymized"
        );

        Ok(batch)
    }

    /// Resolve requested types and threshold, rejecting unsupported values
    fn request_parameters(
        &self,
        options: &AnonymizationOptions,
    ) -> Result<(HashSet<EntityType>, f32)> {
        let threshold = options
            .confidence_threshold
            .unwrap_or(self.config.confidence_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(InputError::ThresholdOutOfRange(threshold).into());
        }

        let requested: HashSet<EntityType> = match &options.entity_types {
            Some(types) => {
                let supported = self.recognizers.supported_types();
                if let Some(unsupported) = types.iter().find(|t| !supported.contains(*t)) {
                    return Err(
                        InputError::UnsupportedEntityType(unsupported.as_str().to_string()).into(),
                    );
                }
                types.iter().cloned().collect()
            }
            None => self.config.enabled_entity_types.iter().cloned().collect(),
        };

        Ok((requested, threshold))
    }

    fn check_text(&self, text: &str) -> std::result::Result<(), InputError> {
        if text.is_empty() {
            return Err(InputError::EmptyText);
        }
        if text.len() > self.config.max_text_length {
            return Err(InputError::TextTooLong {
                len: text.len(),
                max: self.config.max_text_length,
            });
        }
        Ok(())
    }

    fn validate_text(&self, text: &str) -> Result<()> {
        self.check_text(text).map_err(MasqueradeError::from)
    }

    async fn process(
        &self,
        text: &str,
        requested: &HashSet<EntityType>,
        threshold: f32,
    ) -> Result<AnonymizationResult> {
        let start = Instant::now();

        let detection = self
            .recognizers
            .detect(text, Some(requested), &self.config.language)
            .await;
        let mut diagnostics = detection.diagnostics;

        let entities_detected = detection
            .spans
            .iter()
            .filter(|s| s.score() >= threshold && requested.contains(s.entity_type()))
            .count();

        let spans: Vec<Span> = merge(detection.spans, threshold, Some(requested))
            .into_iter()
            .filter(|span| {
                let on_boundary = span.text(text).is_some();
                if !on_boundary {
                    tracing::warn!(
                        recognizer = span.source(),
                        start = span.start(),
                        end = span.end(),
                        "Dropping span that does not fall on character boundaries"
                    );
                }
                on_boundary
            })
            .collect();

        if spans.is_empty() {
            let mut result = AnonymizationResult::unchanged(text, elapsed_ms(start), diagnostics);
            result.entities_detected = entities_detected;
            return Ok(result);
        }

        // Collect first: a borrowing `map` closure inside the stream breaks `Send`
        let pending: Vec<_> = spans.iter().map(|span| self.resolve(text, span)).collect();
        let resolutions: Vec<Resolution> = stream::iter(pending)
            .buffered(self.config.span_concurrency)
            .try_collect()
            .await?;

        let mut anonymized_text = text.to_string();
        for resolution in resolutions.iter().rev() {
            let sub = &resolution.substitution;
            anonymized_text.replace_range(sub.start..sub.end, &sub.substitute);
        }

        let new_mappings_created = resolutions
            .iter()
            .filter(|r| r.mapping_created == Some(true))
            .count();
        let existing_mappings_used = resolutions
            .iter()
            .filter(|r| r.mapping_created == Some(false))
            .count();

        let mut substitutions = Vec::with_capacity(resolutions.len());
        for resolution in resolutions {
            if let Some(reason) = resolution.fallback {
                diagnostics.push(Diagnostic::GenerationFallback {
                    entity_type: resolution.substitution.entity_type.clone(),
                    reason,
                });
            }
            substitutions.push(resolution.substitution);
        }

        let processing_time_ms = elapsed_ms(start);
        tracing::debug!(
            spans = substitutions.len(),
            new_mappings = new_mappings_created,
            reused = existing_mappings_used,
            duration_ms = processing_time_ms,
            "Text anonymized"
        );

        Ok(AnonymizationResult {
            anonymized_text,
            entities_anonymized: substitutions.len(),
            substitutions,
            entities_detected,
            new_mappings_created,
            existing_mappings_used,
            processing_time_ms,
            diagnostics,
        })
    }

    async fn resolve(&self, text: &str, span: &Span) -> Result<Resolution> {
        let entity_type = span.entity_type();
        let original = span.text(text).ok_or_else(|| {
            MasqueradeError::Other(format!(
                "span {}..{} is outside the text",
                span.start(),
                span.end()
            ))
        })?;

        let (substitute, mapping_created, fallback) = match self.operators.get(entity_type) {
            Some(operator) => (operator.operate(original, entity_type), None, None),
            None => {
                let mut fallback = None;
                let (substitute, created) = self
                    .store
                    .get_or_create(original, entity_type, |fingerprint| {
                        let generated =
                            self.generator
                                .generate(entity_type, Some(original), Some(fingerprint));
                        fallback = generated.fallback;
                        generated.value
                    })
                    .await?;
                (substitute, Some(created), fallback)
            }
        };

        Ok(Resolution {
            substitution: Substitution {
                start: span.start(),
                end: span.end(),
                entity_type: entity_type.clone(),
                original_length: span.len(),
                substitute,
                created: mapping_created == Some(true),
            },
            mapping_created,
            fallback,
        })
    }

    /// Record an audit event; failures are logged and returned as a diagnostic
    fn audit(&self, event: &AuditEvent) -> Option<Diagnostic> {
        let sink = self.audit.as_ref()?;
        match sink.record(event) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    operation = event.operation.as_str(),
                    error = %e,
                    "Failed to write audit record"
                );
                Some(Diagnostic::AuditFailure {
                    message: format!("{e:#}"),
                })
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::audit::MemoryAuditSink;
    use crate::anonymization::config::StrategyConfig;

    fn config() -> AnonymizationConfig {
        let mut config = AnonymizationConfig::default();
        config.audit.enabled = false;
        config
    }

    fn engine(config: AnonymizationConfig) -> AnonymizationEngine {
        AnonymizationEngine::new(config, MappingStore::in_memory()).unwrap()
    }

    fn options(threshold: f32) -> AnonymizationOptions {
        AnonymizationOptions {
            entity_types: None,
            confidence_threshold: Some(threshold),
        }
    }

    #[tokio::test]
    async fn test_positions_refer_to_original_text() {
        let engine = engine(config());
        let text = "Mail john@example.com or call 555-123-4567 today";
        let result = engine.anonymize(text, &options(0.5)).await.unwrap();

        assert_eq!(result.substitutions.len(), 2);
        for sub in &result.substitutions {
            assert_eq!(sub.original_length, sub.end - sub.start);
        }
        let first = &result.substitutions[0];
        assert_eq!(&text[first.start..first.end], "john@example.com");
        assert!(!result.anonymized_text.contains("john@example.com"));
        assert!(!result.anonymized_text.contains("555-123-4567"));
        assert!(result.anonymized_text.starts_with("Mail "));
        assert!(result.anonymized_text.ends_with(" today"));
    }

    #[tokio::test]
    async fn test_nothing_detected_returns_text_unchanged() {
        let engine = engine(config());
        let result = engine
            .anonymize("nothing to see here", &options(0.5))
            .await
            .unwrap();
        assert_eq!(result.anonymized_text, "nothing to see here");
        assert_eq!(result.entities_anonymized, 0);
    }

    #[tokio::test]
    async fn test_input_validation() {
        let mut config = config();
        config.max_text_length = 10;
        let engine = engine(config);

        assert!(matches!(
            engine.anonymize("", &AnonymizationOptions::default()).await,
            Err(MasqueradeError::InvalidInput(InputError::EmptyText))
        ));
        assert!(matches!(
            engine.anonymize("01234567890", &AnonymizationOptions::default()).await,
            Err(MasqueradeError::InvalidInput(InputError::TextTooLong { len: 11, max: 10 }))
        ));
        assert!(matches!(
            engine.anonymize("x", &options(1.2)).await,
            Err(MasqueradeError::InvalidInput(InputError::ThresholdOutOfRange(_)))
        ));

        let unsupported = AnonymizationOptions {
            entity_types: Some(vec![EntityType::Custom("EMPLOYEE_ID".to_string())]),
            confidence_threshold: None,
        };
        assert!(matches!(
            engine.anonymize("x", &unsupported).await,
            Err(MasqueradeError::InvalidInput(InputError::UnsupportedEntityType(t))) if t == "EMPLOYEE_ID"
        ));
    }

    #[tokio::test]
    async fn test_requested_types_restrict_detection() {
        let engine = engine(config());
        let only_email = AnonymizationOptions {
            entity_types: Some(vec![EntityType::EmailAddress]),
            confidence_threshold: Some(0.5),
        };
        let result = engine
            .anonymize("john@example.com 555-123-4567", &only_email)
            .await
            .unwrap();
        assert_eq!(result.entity_types(), vec![EntityType::EmailAddress]);
        assert!(result.anonymized_text.ends_with("555-123-4567"));
    }

    #[tokio::test]
    async fn test_operator_strategy_skips_store() {
        let mut config = config();
        config.strategies.insert(
            EntityType::EmailAddress,
            StrategyConfig::Redact {
                placeholder: None,
                include_type: true,
            },
        );
        let engine = engine(config);
        let result = engine
            .anonymize("write to john@example.com", &options(0.5))
            .await
            .unwrap();

        assert_eq!(result.anonymized_text, "write to [EMAIL_ADDRESS_REDACTED]");
        assert_eq!(result.new_mappings_created, 0);
        assert_eq!(result.existing_mappings_used, 0);
        assert_eq!(engine.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_repeated_value_in_one_text_uses_one_mapping() {
        let engine = engine(config());
        let result = engine
            .anonymize("a@example.com then a@example.com", &options(0.5))
            .await
            .unwrap();

        assert_eq!(result.substitutions.len(), 2);
        assert_eq!(
            result.substitutions[0].substitute,
            result.substitutions[1].substitute
        );
        assert_eq!(result.new_mappings_created, 1);
        assert_eq!(result.existing_mappings_used, 1);
    }

    #[tokio::test]
    async fn test_audit_event_recorded() {
        let sink = Arc::new(MemoryAuditSink::new());
        let engine = engine(config()).with_audit_sink(Some(sink.clone() as Arc<dyn AuditSink>));
        let text = "write to john@example.com";
        engine.anonymize(text, &options(0.5)).await.unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, OperationKind::Anonymize);
        assert_eq!(events[0].input_length, text.len());
        assert_eq!(events[0].entity_types, vec![EntityType::EmailAddress]);
    }

    struct FailingSink;

    impl AuditSink for FailingSink {
        fn record(&self, _event: &AuditEvent) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_audit_failure_is_a_diagnostic() {
        let engine = engine(config()).with_audit_sink(Some(Arc::new(FailingSink)));
        let result = engine
            .anonymize("write to john@example.com", &options(0.5))
            .await
            .unwrap();
        assert!(result
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::AuditFailure { message } if message.contains("disk full"))));
    }

    #[tokio::test]
    async fn test_batch_validation() {
        let mut config = config();
        config.max_batch_size = 2;
        let engine = engine(config);
        let opts = AnonymizationOptions::default();

        assert!(matches!(
            engine.anonymize_batch(&[], &opts, None).await,
            Err(MasqueradeError::InvalidInput(InputError::EmptyBatch))
        ));
        let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(matches!(
            engine.anonymize_batch(&three, &opts, None).await,
            Err(MasqueradeError::InvalidInput(InputError::BatchTooLarge { len: 3, max: 2 }))
        ));
        let with_empty = vec!["a".to_string(), String::new()];
        assert!(matches!(
            engine.anonymize_batch(&with_empty, &opts, None).await,
            Err(MasqueradeError::InvalidInput(InputError::BatchItem { index: 1, .. }))
        ));
    }

    #[tokio::test]
    async fn test_batch_stops_on_shutdown() {
        let engine = engine(config());
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let texts = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        let batch = engine
            .anonymize_batch(&texts, &options(0.5), Some(&rx))
            .await
            .unwrap();
        assert!(batch.interrupted);
        assert!(batch.results.is_empty());
    }

    #[tokio::test]
    async fn test_supported_entity_types_listing() {
        let engine = engine(config());
        let types = engine.supported_entity_types();
        let email = types
            .iter()
            .find(|t| t.entity_type == EntityType::EmailAddress)
            .unwrap();
        assert!(email.enabled);
        assert_eq!(email.strategy, "consistent_replace");
        assert!(!email.description.is_empty());
        assert!(types.iter().any(|t| t.entity_type == EntityType::Person));
    }
}
