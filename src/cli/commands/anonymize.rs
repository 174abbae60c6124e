//! Anonymize command implementation
//!
//! Reads text from the argument, a file or stdin and writes the anonymized
//! text to stdout. Summaries and errors go to stderr so the output can be
//! piped.

use super::{
    exit_code_for, load_or_report, open_store_or_report, EXIT_CONFIG_ERROR, EXIT_INTERRUPTED,
    EXIT_INVALID_INPUT, EXIT_SUCCESS,
};
use crate::anonymization::{
    AnonymizationEngine, AnonymizationOptions, AnonymizationResult, BatchResult, Diagnostic,
    EntityType,
};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tokio::sync::watch;

/// Arguments for the anonymize command
#[derive(Args, Debug, Default)]
pub struct AnonymizeArgs {
    /// Text to anonymize (reads --file or stdin when omitted)
    pub text: Option<String>,

    /// Read input from a file
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Treat every non-empty input line as a separate text
    #[arg(long)]
    pub batch: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Entity types to detect (comma-separated, e.g. PERSON,EMAIL_ADDRESS)
    #[arg(long, value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Minimum confidence score (0.0 - 1.0)
    #[arg(long)]
    pub threshold: Option<f32>,
}

impl AnonymizeArgs {
    /// Execute the anonymize command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let input = self.read_input().await?;
        if input.trim().is_empty() {
            eprintln!("❌ No input text provided");
            return Ok(EXIT_INVALID_INPUT);
        }

        let store = match open_store_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let engine = match AnonymizationEngine::new(config.anonymization, store) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("❌ Failed to initialize anonymization engine");
                eprintln!("   Error: {e:#}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let options = self.options();

        if self.batch {
            let texts = split_batch(&input);
            tracing::info!(texts = texts.len(), "Anonymizing batch");
            match engine
                .anonymize_batch(&texts, &options, Some(&shutdown_signal))
                .await
            {
                Ok(batch) => self.print_batch(&batch),
                Err(e) => {
                    eprintln!("❌ Anonymization failed: {e}");
                    Ok(exit_code_for(&e))
                }
            }
        } else {
            match engine.anonymize(&input, &options).await {
                Ok(result) => self.print_single(&result),
                Err(e) => {
                    eprintln!("❌ Anonymization failed: {e}");
                    Ok(exit_code_for(&e))
                }
            }
        }
    }

    fn options(&self) -> AnonymizationOptions {
        AnonymizationOptions {
            entity_types: self
                .types
                .as_ref()
                .map(|types| types.iter().map(|t| EntityType::from(t.trim())).collect()),
            confidence_threshold: self.threshold,
        }
    }

    async fn read_input(&self) -> anyhow::Result<String> {
        if let Some(ref text) = self.text {
            return Ok(text.clone());
        }
        if let Some(ref path) = self.file {
            return tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read input file {}", path.display()));
        }

        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .context("Failed to read stdin")?;
        // A single text piped through `echo` carries one trailing newline
        if !self.batch && buffer.ends_with('\n') {
            buffer.pop();
            if buffer.ends_with('\r') {
                buffer.pop();
            }
        }
        Ok(buffer)
    }

    fn print_single(&self, result: &AnonymizationResult) -> anyhow::Result<i32> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(result)?);
        } else {
            println!("{}", result.anonymized_text);
            eprintln!(
                "✅ {} of {} detected entities anonymized ({} new mappings, {} ms)",
                result.entities_anonymized,
                result.entities_detected,
                result.new_mappings_created,
                result.processing_time_ms
            );
            print_diagnostics(&result.diagnostics);
        }
        Ok(EXIT_SUCCESS)
    }

    fn print_batch(&self, batch: &BatchResult) -> anyhow::Result<i32> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(batch)?);
        } else {
            for result in &batch.results {
                println!("{}", result.anonymized_text);
                print_diagnostics(&result.diagnostics);
            }
            eprintln!(
                "✅ {} texts, {} entities anonymized ({} ms)",
                batch.results.len(),
                batch.total_entities_anonymized,
                batch.total_processing_time_ms
            );
        }

        if batch.interrupted {
            eprintln!("⚠️  Batch interrupted by shutdown signal; remaining texts were skipped");
            return Ok(EXIT_INTERRUPTED);
        }
        Ok(EXIT_SUCCESS)
    }
}

fn split_batch(input: &str) -> Vec<String> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic {
            Diagnostic::RecognizerFailure {
                recognizer,
                message,
            } => eprintln!("⚠️  Recognizer {recognizer} failed: {message}"),
            Diagnostic::GenerationFallback {
                entity_type,
                reason,
            } => eprintln!("⚠️  Placeholder used for {entity_type}: {reason}"),
            Diagnostic::AuditFailure { message } => {
                eprintln!("⚠️  Audit record not written: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_batch_skips_blank_lines() {
        let texts = split_batch("first line\n\n   \nsecond line\r\n");
        assert_eq!(texts, vec!["first line", "second line"]);
    }

    #[test]
    fn test_options_from_args() {
        let args = AnonymizeArgs {
            types: Some(vec!["PERSON".to_string(), " EMAIL_ADDRESS".to_string()]),
            threshold: Some(0.4),
            ..Default::default()
        };
        let options = args.options();
        assert_eq!(
            options.entity_types,
            Some(vec![EntityType::Person, EntityType::EmailAddress])
        );
        assert_eq!(options.confidence_threshold, Some(0.4));
    }

    #[tokio::test]
    async fn test_read_input_prefers_argument() {
        let args = AnonymizeArgs {
            text: Some("call 555-123-4567".to_string()),
            ..Default::default()
        };
        assert_eq!(args.read_input().await.unwrap(), "call 555-123-4567");
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, "a\nb\n").unwrap();

        let args = AnonymizeArgs {
            file: Some(path),
            batch: true,
            ..Default::default()
        };
        assert_eq!(args.read_input().await.unwrap(), "a\nb\n");
    }
}
