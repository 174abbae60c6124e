//! Init command implementation
//!
//! Writes a sample `masquerade.toml`.

use super::{EXIT_CONFIG_ERROR, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "masquerade.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Masquerade configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG_ERROR);
        }

        let config_content = if self.with_examples {
            CONFIG_WITH_EXAMPLES
        } else {
            MINIMAL_CONFIG
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. For durable mappings set [store] backend = \"postgresql\"");
                println!("     and export DATABASE_URL (or put it in a .env file)");
                println!("  3. Validate configuration: masquerade validate-config");
                println!("  4. Try it: echo 'Call John Smith at 555-123-4567' | masquerade anonymize");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

const MINIMAL_CONFIG: &str = r#"# Masquerade Configuration File
# Consistent PII pseudonymization

environment = "development"

[application]
log_level = "info"

[anonymization]
confidence_threshold = 0.7
locale = "en_US"

[anonymization.audit]
enabled = true
log_path = "./audit/anonymization.log"
format = "json"

[store]
backend = "memory"  # memory | postgresql

# [store.postgresql]
# connection_string = "${DATABASE_URL}"

[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"
"#;

const CONFIG_WITH_EXAMPLES: &str = r#"# Masquerade Configuration File
# Consistent PII pseudonymization
#
# Every option is listed with its default. Values of the form ${VAR} are
# substituted from the environment (comment lines are ignored). Any
# MASQUERADE_* environment variable overrides the file.

# ============================================================================
# Environment (development | staging | production)
# ============================================================================
# Production refuses the in-memory store: substitutes must survive restarts.
environment = "development"

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Anonymization
# ============================================================================
[anonymization]
# Spans scoring below this are ignored (0.0 - 1.0)
confidence_threshold = 0.7

# Language passed to recognizers
language = "en"

# Locale for synthetic values: en_US | fr_FR | zh_CN | zh_TW
locale = "en_US"

# Input limits
max_text_length = 1000000
max_batch_size = 1000

# Spans resolved concurrently per text
span_concurrency = 8

# Entity types detected when a request does not name any
enabled_entity_types = [
    "PERSON",
    "EMAIL_ADDRESS",
    "PHONE_NUMBER",
    "CREDIT_CARD",
    "US_SSN",
    "IP_ADDRESS",
    "LOCATION",
    "STREET_ADDRESS",
    "DATE_TIME",
    "GUID",
]

# Custom pattern library (TOML). Defaults to the built-in patterns.
# pattern_library = "./patterns/default_patterns.toml"

# Per-type strategy overrides. Types without an entry use
# consistent_replace: a stable synthetic value from the mapping store.
#
# [anonymization.strategies.CREDIT_CARD]
# strategy = "mask"          # keep the last 4 characters
# masking_char = "*"
# chars_to_mask = 12
# from_end = false
#
# [anonymization.strategies.US_SSN]
# strategy = "hash"
# hash_type = "sha256"       # sha256 | sha512
# truncate = 16
#
# [anonymization.strategies.CRYPTO]
# strategy = "redact"
# include_type = true        # "[CRYPTO_REDACTED]"

[anonymization.audit]
# One record per operation: types, counts, lengths, duration. Never values.
enabled = true
log_path = "./audit/anonymization.log"
format = "json"              # json | text

# ============================================================================
# Mapping Store
# ============================================================================
[store]
backend = "memory"           # memory | postgresql

# [store.postgresql]
# connection_string = "${DATABASE_URL}"
# max_connections = 10                # 1 - 100
# connection_timeout_seconds = 30
# statement_timeout_seconds = 60
# ssl_mode = "prefer"                 # disable | allow | prefer | require | verify-ca | verify-full
#
# The pii_mappings table is created on first use
# (see migrations/001_pii_mappings.sql).

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = true
local_path = "./logs"
local_rotation = "daily"     # daily | hourly | never
local_max_files = 14         # 0 keeps every file
"#;
