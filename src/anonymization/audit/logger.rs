//! File-backed audit sink

use super::{AuditEvent, AuditSink};
use crate::anonymization::config::{AuditConfig, AuditFormat};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

/// Appends audit events to a file, one line per event
pub struct FileAuditSink {
    log_path: PathBuf,
    format: AuditFormat,
    // Serializes appends from concurrent requests
    write_lock: Mutex<()>,
}

impl FileAuditSink {
    /// Create the sink, creating the log directory if needed
    pub fn new(log_path: PathBuf, format: AuditFormat) -> Result<Self> {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create audit log directory: {}", parent.display())
            })?;
        }

        Ok(Self {
            log_path,
            format,
            write_lock: Mutex::new(()),
        })
    }

    /// Sink for the configured audit section, or `None` when auditing is off
    pub fn from_config(config: &AuditConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        Self::new(config.log_path.clone(), config.format).map(Some)
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    fn format_line(&self, event: &AuditEvent) -> Result<String> {
        match self.format {
            AuditFormat::Json => {
                serde_json::to_string(event).context("Failed to serialize audit entry")
            }
            AuditFormat::Text => {
                let types: Vec<&str> = event.entity_types.iter().map(|t| t.as_str()).collect();
                Ok(format!(
                    "[{}] Operation: {} | Types: {} | Input: {} bytes | Detected: {} | Anonymized: {} | New mappings: {} | Time: {}ms",
                    event.timestamp.to_rfc3339(),
                    event.operation.as_str(),
                    if types.is_empty() { "-".to_string() } else { types.join(",") },
                    event.input_length,
                    event.entities_detected,
                    event.entities_anonymized,
                    event.new_mappings_created,
                    event.duration_ms
                ))
            }
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<()> {
        let line = self.format_line(event)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("audit log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;
        writeln!(file, "{line}").context("Failed to write audit entry")?;

        Ok(())
    }
}
