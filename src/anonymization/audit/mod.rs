//! Audit trail for anonymization operations
//!
//! One event per operation. Events carry counts, entity types and timings
//! only; original values and substitutes never reach an audit sink.

pub mod logger;

use crate::anonymization::models::EntityType;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

pub use logger::FileAuditSink;

/// Kind of audited operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Anonymize,
    BatchAnonymize,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymize => "anonymize",
            Self::BatchAnonymize => "batch_anonymize",
        }
    }
}

/// A single audit record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub operation: OperationKind,
    pub entity_types: Vec<EntityType>,
    /// Input size in bytes, summed over a batch
    pub input_length: usize,
    pub entities_detected: usize,
    pub entities_anonymized: usize,
    pub new_mappings_created: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

/// Destination for audit events
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<()>;
}

/// Keeps events in memory; for tests and embedding
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| anyhow::anyhow!("audit event buffer lock poisoned"))?
            .push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemoryAuditSink::new();
        let event = AuditEvent {
            timestamp: Utc::now(),
            operation: OperationKind::Anonymize,
            entity_types: vec![EntityType::Person],
            input_length: 10,
            entities_detected: 1,
            entities_anonymized: 1,
            new_mappings_created: 1,
            duration_ms: 3,
            batch_size: None,
        };
        sink.record(&event).unwrap();
        assert_eq!(sink.events(), vec![event]);
    }

    #[test]
    fn test_event_serialization() {
        let event = AuditEvent {
            timestamp: Utc::now(),
            operation: OperationKind::BatchAnonymize,
            entity_types: vec![EntityType::EmailAddress],
            input_length: 42,
            entities_detected: 2,
            entities_anonymized: 2,
            new_mappings_created: 0,
            duration_ms: 5,
            batch_size: Some(3),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["operation"], "batch_anonymize");
        assert_eq!(json["entity_types"][0], "EMAIL_ADDRESS");
        assert_eq!(json["batch_size"], 3);
    }
}
