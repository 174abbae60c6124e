//! Validate config command implementation

use super::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::anonymization::detector::PatternRegistry;
use crate::config::{load_config, MasqueradeConfig, StoreBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading already validates every section
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let patterns = match config.anonymization.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        };
        let recognizer_count = match patterns {
            Ok(registry) => registry.recognizers().len(),
            Err(e) => {
                println!("❌ Pattern library failed to load");
                println!("   Error: {e:#}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!();
        print!("{}", summary(&config, recognizer_count));
        println!();
        Ok(EXIT_SUCCESS)
    }
}

fn summary(config: &MasqueradeConfig, recognizer_count: usize) -> String {
    let anonymization = &config.anonymization;
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Environment: {:?}", config.environment),
        format!("  Log Level: {}", config.application.log_level),
        format!(
            "  Confidence Threshold: {}",
            anonymization.confidence_threshold
        ),
        format!("  Locale: {}", anonymization.locale),
        format!("  Pattern Recognizers: {recognizer_count}"),
        format!(
            "  Enabled Entity Types: {}",
            anonymization
                .enabled_entity_types
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ];

    for (entity_type, strategy) in &anonymization.strategies {
        lines.push(format!("  Strategy {}: {}", entity_type, strategy.name()));
    }

    lines.push(format!(
        "  Audit Log: {}",
        if anonymization.audit.enabled {
            anonymization.audit.log_path.display().to_string()
        } else {
            "disabled".to_string()
        }
    ));

    lines.push(format!("  Store Backend: {}", config.store.backend.as_str()));
    if config.store.backend == StoreBackend::PostgreSQL {
        if let Some(ref pg) = config.store.postgresql {
            use secrecy::ExposeSecret;
            let target = pg
                .connection_string
                .expose_secret()
                .rsplit_once('@')
                .map(|(_, target)| target.to_string())
                .unwrap_or_else(|| "***".to_string());
            lines.push(format!("  PostgreSQL Target: {target}"));
            lines.push(format!("  Max Connections: {}", pg.max_connections));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
