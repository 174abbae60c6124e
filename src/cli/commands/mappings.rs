//! Mapping administration commands
//!
//! `mappings list|show|update|delete|purge|export` operate directly on the
//! configured store. Fingerprints are shown truncated; original values are
//! never stored and cannot be shown.

use super::{
    exit_code_for, load_or_report, open_store_or_report, EXIT_FATAL, EXIT_INVALID_INPUT,
    EXIT_SUCCESS,
};
use crate::anonymization::models::EntityType;
use crate::anonymization::store::{Mapping, MappingStore, TimeRange};
use crate::domain::Result as StoreResult;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for the mappings command
#[derive(Args, Debug)]
pub struct MappingsArgs {
    #[command(subcommand)]
    pub command: MappingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MappingsCommand {
    /// List mappings, newest first
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Only show one entity type
        #[arg(long = "type")]
        entity_type: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show a single mapping
    Show { id: i64 },

    /// Replace the substitute of a mapping
    Update { id: i64, substitute: String },

    /// Delete a single mapping
    Delete { id: i64 },

    /// Delete every mapping
    Purge {
        /// Confirm the purge
        #[arg(long)]
        yes: bool,
    },

    /// Export mappings first seen within a time range as JSON
    Export {
        /// Inclusive lower bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        since: Option<DateTime<Utc>>,

        /// Exclusive upper bound (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        until: Option<DateTime<Utc>>,

        #[arg(long = "type")]
        entity_type: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl MappingsArgs {
    /// Execute the mappings command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let store = match open_store_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        self.run(&store).await
    }

    /// Run against an already-open store
    pub async fn run(&self, store: &MappingStore) -> anyhow::Result<i32> {
        Ok(report(self.dispatch(store).await))
    }

    async fn dispatch(&self, store: &MappingStore) -> StoreResult<anyhow::Result<i32>> {
        match &self.command {
            MappingsCommand::List {
                limit,
                offset,
                entity_type,
                json,
            } => {
                let filter = entity_type.as_deref().map(EntityType::from);
                let page = store.list(*limit, *offset, filter.as_ref()).await?;
                if *json {
                    return Ok(print_json(&page));
                }

                if page.mappings.is_empty() {
                    println!("No mappings found.");
                    return Ok(Ok(EXIT_SUCCESS));
                }
                println!(
                    "Showing {}-{} of {} mapping(s):",
                    page.offset + 1,
                    page.offset + page.mappings.len(),
                    page.total
                );
                println!();
                println!(
                    "{:<8} {:<20} {:<18} {:<8} {:<20} {}",
                    "ID", "Type", "Fingerprint", "Uses", "Last Used", "Substitute"
                );
                println!("{}", "-".repeat(100));
                for mapping in &page.mappings {
                    print_row(mapping);
                }
                Ok(Ok(EXIT_SUCCESS))
            }

            MappingsCommand::Show { id } => {
                let mapping = store.get(*id).await?;
                Ok(print_json(&mapping))
            }

            MappingsCommand::Update { id, substitute } => {
                let mapping = store.update_substitute(*id, substitute).await?;
                tracing::info!(
                    id = mapping.id,
                    entity_type = %mapping.entity_type,
                    "Mapping substitute updated"
                );
                println!("✅ Mapping {} updated", mapping.id);
                Ok(Ok(EXIT_SUCCESS))
            }

            MappingsCommand::Delete { id } => {
                store.delete(*id).await?;
                println!("✅ Mapping {id} deleted");
                Ok(Ok(EXIT_SUCCESS))
            }

            MappingsCommand::Purge { yes } => {
                if !yes {
                    eprintln!("❌ Refusing to delete every mapping without --yes");
                    eprintln!("   Substitutes for previously seen values will change after a purge.");
                    return Ok(Ok(EXIT_INVALID_INPUT));
                }
                let removed = store.delete_all().await?;
                println!("✅ Deleted {removed} mapping(s)");
                Ok(Ok(EXIT_SUCCESS))
            }

            MappingsCommand::Export {
                since,
                until,
                entity_type,
                output,
            } => {
                if let (Some(since), Some(until)) = (since, until) {
                    if since >= until {
                        eprintln!("❌ --since must be earlier than --until");
                        return Ok(Ok(EXIT_INVALID_INPUT));
                    }
                }
                let range = TimeRange {
                    since: *since,
                    until: *until,
                    entity_type: entity_type.as_deref().map(EntityType::from),
                };
                let mappings = store.export(&range).await?;
                Ok(write_export(&mappings, output.as_ref()))
            }
        }
    }
}

/// Flatten a command outcome into an exit code, reporting any error
fn report(outcome: StoreResult<anyhow::Result<i32>>) -> i32 {
    match outcome {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            eprintln!("❌ {e:#}");
            EXIT_FATAL
        }
        Err(e) => {
            tracing::error!(error = %e, "Mapping command failed");
            eprintln!("❌ {e}");
            exit_code_for(&e)
        }
    }
}

fn print_row(mapping: &Mapping) {
    let fingerprint: String = mapping.fingerprint.chars().take(16).collect();
    println!(
        "{:<8} {:<20} {:<18} {:<8} {:<20} {}",
        mapping.id,
        mapping.entity_type.as_str(),
        fingerprint,
        mapping.use_count,
        mapping.last_used.format("%Y-%m-%d %H:%M:%S"),
        mapping.substitute
    );
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<i32> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(EXIT_SUCCESS)
}

fn write_export(mappings: &[Mapping], output: Option<&PathBuf>) -> anyhow::Result<i32> {
    let json = serde_json::to_string_pretty(mappings)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write export to {}", path.display()))?;
            println!(
                "✅ Exported {} mapping(s) to {}",
                mappings.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(EXIT_SUCCESS)
}

/// Parse an RFC 3339 timestamp or a bare date (midnight UTC)
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("'{value}' is not an RFC 3339 timestamp or YYYY-MM-DD date"))
}
