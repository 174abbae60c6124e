//! Stats command implementation

use super::{exit_code_for, load_or_report, open_store_or_report, EXIT_SUCCESS};
use crate::anonymization::store::{MappingStatistics, MappingStore};
use clap::Args;

/// Arguments for the stats command
#[derive(Args, Debug, Default)]
pub struct StatsArgs {
    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    /// Execute the stats command
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

    pub async fn run(&self, store: &MappingStore) -> anyhow::Result<i32> {
        let stats = match store.statistics().await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to compute statistics");
                eprintln!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            print!("{}", render(&stats));
        }
        Ok(EXIT_SUCCESS)
    }
}

fn render(stats: &MappingStatistics) -> String {
    let mut out = String::new();
    out.push_str("📊 Mapping Statistics\n\n");
    out.push_str(&format!("  Total mappings:      {}\n", stats.total_mappings));
    out.push_str(&format!("  Total substitutions: {}\n", stats.total_substitutions));

    let timestamp = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    out.push_str(&format!("  Oldest mapping:      {}\n", timestamp(stats.oldest_mapping)));
    out.push_str(&format!("  Newest mapping:      {}\n", timestamp(stats.newest_mapping)));

    if !stats.by_entity_type.is_empty() {
        out.push('\n');
        out.push_str(&format!(
            "  {:<20} {:>14} {:>14}\n",
            "Entity Type", "Unique Values", "Substitutions"
        ));
        out.push_str(&format!("  {}\n", "-".repeat(50)));
        for (entity_type, figures) in &stats.by_entity_type {
            out.push_str(&format!(
                "  {:<20} {:>14} {:>14}\n",
                entity_type, figures.unique_values, figures.substitutions
            ));
        }
    }
    out
}
