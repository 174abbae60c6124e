//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - Shutdown signals propagate to every receiver
//! - A batch finishes the text in progress and stops before the next one
//! - Results produced before the signal are returned and stay consistent
//! - The CLI reports an interrupted batch with its own exit code

use async_trait::async_trait;
use masquerade::anonymization::detector::ExternalRecognizer;
use masquerade::anonymization::store::MappingStore;
use masquerade::anonymization::{
    AnonymizationConfig, AnonymizationEngine, AnonymizationOptions, EntityType, Span,
};
use masquerade::cli::commands::anonymize::AnonymizeArgs;
use masquerade::cli::commands::{EXIT_INTERRUPTED, EXIT_SUCCESS};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

/// Recognizer that raises the shutdown flag when it reads a marker
///
/// Simulates a signal arriving while a text is being processed.
struct SignalOnMarker {
    shutdown_tx: watch::Sender<bool>,
}

#[async_trait]
impl ExternalRecognizer for SignalOnMarker {
    fn id(&self) -> &str {
        "signal_on_marker"
    }

    fn supported_types(&self) -> Vec<EntityType> {
        vec![EntityType::Person]
    }

    async fn analyze(
        &self,
        text: &str,
        _requested_types: &[EntityType],
        _language: &str,
    ) -> anyhow::Result<Vec<Span>> {
        if text.contains("[stop]") {
            let _ = self.shutdown_tx.send(true);
        }
        Ok(Vec::new())
    }
}

fn engine(store: MappingStore) -> AnonymizationEngine {
    let mut config = AnonymizationConfig::default();
    config.audit.enabled = false;
    AnonymizationEngine::new(config, store).unwrap()
}

fn options() -> AnonymizationOptions {
    AnonymizationOptions {
        entity_types: None,
        confidence_threshold: Some(0.5),
    }
}

#[tokio::test]
async fn test_batch_finishes_current_text_then_stops() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let store = MappingStore::in_memory();
    let engine = engine(store.clone())
        .with_external_recognizer(Arc::new(SignalOnMarker { shutdown_tx }));

    let texts = vec![
        "first a@example.com".to_string(),
        "second b@example.com [stop]".to_string(),
        "third c@example.com".to_string(),
        "fourth d@example.com".to_string(),
    ];
    let batch = engine
        .anonymize_batch(&texts, &options(), Some(&shutdown_rx))
        .await
        .unwrap();

    assert!(batch.interrupted);
    assert_eq!(batch.results.len(), 2);
    assert!(!batch.results[1].anonymized_text.contains("b@example.com"));
    assert!(batch.results[1].anonymized_text.ends_with("[stop]"));

    // Nothing was created for the texts that were never processed
    assert_eq!(store.count().await.unwrap(), 2);
    assert!(store
        .lookup("c@example.com", &EntityType::EmailAddress)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_interrupted_batch_can_be_resumed_consistently() {
    let store = MappingStore::in_memory();
    let texts = vec![
        "one a@example.com".to_string(),
        "two b@example.com".to_string(),
    ];

    let (tx, rx) = watch::channel(false);
    let first = engine(store.clone())
        .anonymize_batch(&texts[..1], &options(), Some(&rx))
        .await
        .unwrap();
    tx.send(true).unwrap();
    let stopped = engine(store.clone())
        .anonymize_batch(&texts, &options(), Some(&rx))
        .await
        .unwrap();
    assert!(stopped.interrupted && stopped.results.is_empty());

    // Resume after restart with a fresh signal
    let (_tx, rx) = watch::channel(false);
    let resumed = engine(store)
        .anonymize_batch(&texts, &options(), Some(&rx))
        .await
        .unwrap();
    assert!(!resumed.interrupted);
    assert_eq!(
        resumed.results[0].anonymized_text,
        first.results[0].anonymized_text
    );
    assert_eq!(resumed.results[0].new_mappings_created, 0);
    assert_eq!(resumed.results[1].new_mappings_created, 1);
}

fn write(dir: &std::path::Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path.to_string_lossy().to_string()
}

const CLI_CONFIG: &str = r#"
[anonymization]
confidence_threshold = 0.5

[anonymization.audit]
enabled = false

[store]
backend = "memory"
"#;

#[tokio::test]
async fn test_cli_batch_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "masquerade.toml", CLI_CONFIG);
    let input = write(
        dir.path(),
        "input.txt",
        "mail a@example.com\n\nmail b@example.com\n",
    );

    let args = AnonymizeArgs {
        file: Some(input.into()),
        batch: true,
        ..AnonymizeArgs::default()
    };

    let (_tx, running) = watch::channel(false);
    assert_eq!(args.execute(&config, running).await.unwrap(), EXIT_SUCCESS);

    let (tx, stopped) = watch::channel(false);
    tx.send(true).unwrap();
    assert_eq!(
        args.execute(&config, stopped).await.unwrap(),
        EXIT_INTERRUPTED
    );
}
