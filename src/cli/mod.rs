//! CLI interface and argument parsing

pub mod commands;

use clap::{Parser, Subcommand};

/// Masquerade - consistent PII pseudonymization
#[derive(Parser, Debug)]
#[command(name = "masquerade")]
#[command(version, about, long_about = None)]
#[command(author = "Masquerade Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "masquerade.toml", env = "MASQUERADE_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MASQUERADE_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace PII in text with consistent synthetic values
    Anonymize(commands::anonymize::AnonymizeArgs),

    /// Inspect and administer stored mappings
    Mappings(commands::mappings::MappingsArgs),

    /// Show mapping store statistics
    Stats(commands::stats::StatsArgs),

    /// Check mapping store connectivity
    Status(commands::status::StatusArgs),

    /// List detectable entity types
    EntityTypes(commands::entity_types::EntityTypesArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Whether the command writes its result to stdout
    ///
    /// Those commands keep console logging at `warn` unless a level is given
    /// explicitly, so piped output is not interleaved with log lines.
    pub fn writes_data_to_stdout(&self) -> bool {
        matches!(
            self,
            Self::Anonymize(_) | Self::Mappings(_) | Self::Stats(_) | Self::EntityTypes(_)
        )
    }
}
