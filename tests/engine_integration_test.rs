//! Integration tests for the anonymization engine
//!
//! These tests exercise the full detect → resolve → rewrite pipeline with the
//! built-in recognizers and an in-memory mapping store.

use async_trait::async_trait;
use masquerade::anonymization::audit::{AuditSink, MemoryAuditSink, OperationKind};
use masquerade::anonymization::detector::ExternalRecognizer;
use masquerade::anonymization::store::MappingStore;
use masquerade::anonymization::{
    AnonymizationConfig, AnonymizationEngine, AnonymizationOptions, Diagnostic, EntityType, Span,
    StrategyConfig,
};
use masquerade::domain::{InputError, MasqueradeError};
use std::sync::Arc;
use tokio::sync::watch;

const SAMPLE: &str = "Contact John Smith at 555-123-4567 or john@example.com";

fn test_config() -> AnonymizationConfig {
    let mut config = AnonymizationConfig::default();
    config.audit.enabled = false;
    config
}

fn engine_with(store: MappingStore) -> AnonymizationEngine {
    AnonymizationEngine::new(test_config(), store).unwrap()
}

fn at(threshold: f32) -> AnonymizationOptions {
    AnonymizationOptions {
        entity_types: None,
        confidence_threshold: Some(threshold),
    }
}

#[tokio::test]
async fn test_contact_line_is_fully_anonymized() {
    let engine = engine_with(MappingStore::in_memory());
    let result = engine.anonymize(SAMPLE, &at(0.5)).await.unwrap();

    let types = result.entity_types();
    assert!(types.contains(&EntityType::Person));
    assert!(types.contains(&EntityType::PhoneNumber));
    assert!(types.contains(&EntityType::EmailAddress));

    assert!(!result.anonymized_text.contains("John Smith"));
    assert!(!result.anonymized_text.contains("555-123-4567"));
    assert!(!result.anonymized_text.contains("john@example.com"));
    assert!(result.anonymized_text.starts_with("Contact "));

    // Every substitution points back at the original text
    for sub in &result.substitutions {
        assert_eq!(sub.end - sub.start, sub.original_length);
        assert!(SAMPLE.is_char_boundary(sub.start) && SAMPLE.is_char_boundary(sub.end));
        assert!(sub.created);
    }
    assert_eq!(result.new_mappings_created, result.entities_anonymized);
    assert_eq!(result.existing_mappings_used, 0);
}

#[tokio::test]
async fn test_repeated_requests_are_consistent() {
    let engine = engine_with(MappingStore::in_memory());

    let first = engine.anonymize(SAMPLE, &at(0.5)).await.unwrap();
    let second = engine.anonymize(SAMPLE, &at(0.5)).await.unwrap();

    assert_eq!(first.anonymized_text, second.anonymized_text);
    assert_eq!(second.new_mappings_created, 0);
    assert_eq!(second.existing_mappings_used, first.entities_anonymized);
    assert!(second.substitutions.iter().all(|s| !s.created));
}

#[tokio::test]
async fn test_consistency_survives_a_new_engine_on_the_same_store() {
    let store = MappingStore::in_memory();

    let first = engine_with(store.clone())
        .anonymize(SAMPLE, &at(0.5))
        .await
        .unwrap();
    let second = engine_with(store.clone())
        .anonymize(SAMPLE, &at(0.5))
        .await
        .unwrap();

    assert_eq!(first.anonymized_text, second.anonymized_text);
    assert_eq!(
        store.count().await.unwrap(),
        first.entities_anonymized as u64
    );
}

#[tokio::test]
async fn test_value_reused_across_different_texts() {
    let engine = engine_with(MappingStore::in_memory());
    let only_email = AnonymizationOptions {
        entity_types: Some(vec![EntityType::EmailAddress]),
        confidence_threshold: Some(0.5),
    };

    let a = engine
        .anonymize("Reply to jane@example.org please", &only_email)
        .await
        .unwrap();
    let b = engine
        .anonymize("cc: jane@example.org", &only_email)
        .await
        .unwrap();

    assert_eq!(a.substitutions[0].substitute, b.substitutions[0].substitute);
    assert!(b.anonymized_text.starts_with("cc: "));
}

#[tokio::test]
async fn test_same_value_under_different_types_gets_separate_mappings() {
    let store = MappingStore::in_memory();

    let (as_person, _) = store
        .get_or_create("Jordan", &EntityType::Person, |_| "Alex Carter".to_string())
        .await
        .unwrap();
    let (as_place, created) = store
        .get_or_create("Jordan", &EntityType::Location, |_| "Lisbon".to_string())
        .await
        .unwrap();

    assert!(created);
    assert_ne!(as_person, as_place);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_threshold_filters_low_scoring_spans() {
    let engine = engine_with(MappingStore::in_memory());
    let text = "ask Maria tomorrow";

    // A lone given name scores below the default threshold
    let strict = engine.anonymize(text, &at(0.7)).await.unwrap();
    assert_eq!(strict.anonymized_text, text);
    assert_eq!(strict.entities_anonymized, 0);

    let lenient = engine.anonymize(text, &at(0.3)).await.unwrap();
    assert_eq!(lenient.entity_types(), vec![EntityType::Person]);
    assert!(!lenient.anonymized_text.contains("Maria"));
}

#[tokio::test]
async fn test_unicode_text_keeps_byte_offsets_valid() {
    let engine = engine_with(MappingStore::in_memory());
    let text = "Café résumé — écrire à zoe@example.fr ✉";
    let result = engine.anonymize(text, &at(0.5)).await.unwrap();

    assert_eq!(result.entity_types(), vec![EntityType::EmailAddress]);
    let sub = &result.substitutions[0];
    assert_eq!(&text[sub.start..sub.end], "zoe@example.fr");
    assert!(result.anonymized_text.starts_with("Café résumé — écrire à "));
    assert!(result.anonymized_text.ends_with(" ✉"));
}

#[tokio::test]
async fn test_operator_strategies_apply_per_type() {
    let mut config = test_config();
    config.strategies.insert(
        EntityType::PhoneNumber,
        StrategyConfig::Mask {
            masking_char: '#',
            chars_to_mask: None,
            from_end: false,
        },
    );
    config.strategies.insert(
        EntityType::EmailAddress,
        StrategyConfig::Redact {
            placeholder: Some("<email>".to_string()),
            include_type: false,
        },
    );
    let engine = AnonymizationEngine::new(config, MappingStore::in_memory()).unwrap();

    let result = engine.anonymize(SAMPLE, &at(0.5)).await.unwrap();

    assert!(result.anonymized_text.ends_with("or <email>"));
    assert!(result.anonymized_text.contains("4567"));
    assert!(!result.anonymized_text.contains("555-123"));

    // Only the person name went through the store
    assert_eq!(result.new_mappings_created, 1);
    assert_eq!(engine.store().count().await.unwrap(), 1);
    let operator_subs = result
        .substitutions
        .iter()
        .filter(|s| s.entity_type != EntityType::Person);
    for sub in operator_subs {
        assert!(!sub.created);
    }
}

#[tokio::test]
async fn test_invalid_requests_are_rejected_before_detection() {
    let engine = engine_with(MappingStore::in_memory());

    let err = engine
        .anonymize("", &AnonymizationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MasqueradeError::InvalidInput(InputError::EmptyText)));

    let err = engine.anonymize(SAMPLE, &at(-0.1)).await.unwrap_err();
    assert!(matches!(
        err,
        MasqueradeError::InvalidInput(InputError::ThresholdOutOfRange(_))
    ));
    assert_eq!(engine.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_batch_results_keep_input_order() {
    let sink = Arc::new(MemoryAuditSink::new());
    let engine = engine_with(MappingStore::in_memory())
        .with_audit_sink(Some(sink.clone() as Arc<dyn AuditSink>));

    let texts = vec![
        "first: a@example.com".to_string(),
        "nothing here".to_string(),
        "third: a@example.com and 555-987-6543".to_string(),
    ];
    let batch = engine.anonymize_batch(&texts, &at(0.5), None).await.unwrap();

    assert!(!batch.interrupted);
    assert_eq!(batch.results.len(), 3);
    assert!(batch.results[0].anonymized_text.starts_with("first: "));
    assert_eq!(batch.results[1].anonymized_text, "nothing here");
    assert!(batch.results[2].anonymized_text.starts_with("third: "));
    assert_eq!(
        batch.results[0].substitutions[0].substitute,
        batch.results[2].substitutions[0].substitute
    );
    assert_eq!(
        batch.total_entities_anonymized,
        batch.results.iter().map(|r| r.entities_anonymized).sum::<usize>()
    );

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, OperationKind::BatchAnonymize);
    assert_eq!(events[0].batch_size, Some(3));
}

#[tokio::test]
async fn test_batch_checks_every_text_before_processing() {
    let engine = engine_with(MappingStore::in_memory());
    let texts = vec!["a@example.com".to_string(), String::new()];

    let err = engine
        .anonymize_batch(&texts, &at(0.5), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MasqueradeError::InvalidInput(InputError::BatchItem { index: 1, .. })
    ));
    // Nothing was written for the valid first text
    assert_eq!(engine.store().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_batch_not_interrupted_when_signal_stays_low() {
    let engine = engine_with(MappingStore::in_memory());
    let (_tx, rx) = watch::channel(false);
    let texts = vec!["a@example.com".to_string(), "b@example.com".to_string()];

    let batch = engine
        .anonymize_batch(&texts, &at(0.5), Some(&rx))
        .await
        .unwrap();
    assert!(!batch.interrupted);
    assert_eq!(batch.results.len(), 2);
}

/// Recognizer standing in for an external model
struct EmployeeIdRecognizer;

#[async_trait]
impl ExternalRecognizer for EmployeeIdRecognizer {
    fn id(&self) -> &str {
        "employee_ids"
    }

    fn supported_types(&self) -> Vec<EntityType> {
        vec![EntityType::Custom("EMPLOYEE_ID".to_string())]
    }

    async fn analyze(
        &self,
        text: &str,
        _requested_types: &[EntityType],
        _language: &str,
    ) -> anyhow::Result<Vec<Span>> {
        Ok(text
            .match_indices("EMP-")
            .filter_map(|(start, _)| {
                Span::new(
                    start,
                    (start + 10).min(text.len()),
                    EntityType::Custom("EMPLOYEE_ID".to_string()),
                    0.9,
                    self.id(),
                )
            })
            .collect())
    }
}

#[tokio::test]
async fn test_external_recognizer_contributes_custom_types() {
    let engine = engine_with(MappingStore::in_memory())
        .with_external_recognizer(Arc::new(EmployeeIdRecognizer));
    let employee = EntityType::Custom("EMPLOYEE_ID".to_string());

    assert!(engine
        .supported_entity_types()
        .iter()
        .any(|t| t.entity_type == employee));

    let options = AnonymizationOptions {
        entity_types: Some(vec![employee.clone()]),
        confidence_threshold: Some(0.5),
    };
    let result = engine
        .anonymize("badge EMP-004217 issued", &options)
        .await
        .unwrap();

    assert_eq!(result.entity_types(), vec![employee]);
    assert!(!result.anonymized_text.contains("EMP-004217"));
    assert!(result.anonymized_text.starts_with("badge "));
    assert!(result.anonymized_text.ends_with(" issued"));
}

/// External recognizer that always fails
struct UnavailableModel;

#[async_trait]
impl ExternalRecognizer for UnavailableModel {
    fn id(&self) -> &str {
        "ner_model"
    }

    fn supported_types(&self) -> Vec<EntityType> {
        vec![EntityType::Person]
    }

    async fn analyze(
        &self,
        _text: &str,
        _requested_types: &[EntityType],
        _language: &str,
    ) -> anyhow::Result<Vec<Span>> {
        anyhow::bail!("model endpoint timed out")
    }
}

#[tokio::test]
async fn test_failing_external_recognizer_degrades_to_diagnostic() {
    let engine = engine_with(MappingStore::in_memory())
        .with_external_recognizer(Arc::new(UnavailableModel));

    let result = engine.anonymize(SAMPLE, &at(0.5)).await.unwrap();

    assert!(!result.anonymized_text.contains("john@example.com"));
    assert!(result.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::RecognizerFailure { recognizer, .. } if recognizer == "ner_model"
    )));
}
