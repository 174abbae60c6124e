//! Status command implementation
//!
//! Checks store connectivity and reports the number of stored mappings.

use super::{exit_code_for, load_or_report, EXIT_SUCCESS};
use crate::adapters::database::create_mapping_repository;
use crate::anonymization::store::MappingStore;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking mapping store status");

        println!("📊 Masquerade Status");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        println!("  Environment: {:?}", config.environment);
        println!("  Store backend: {}", config.store.backend.as_str());

        let repository = match create_mapping_repository(&config.store).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Failed to create mapping store");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        Ok(report(&MappingStore::new(repository)).await)
    }
}

async fn report(store: &MappingStore) -> i32 {
    if let Err(e) = store.test_connection().await {
        println!("❌ Mapping store unreachable");
        println!("   Error: {e}");
        return exit_code_for(&e);
    }
    println!("✅ Mapping store reachable");

    match store.count().await {
        Ok(count) => {
            println!("  Stored mappings: {count}");
            println!();
            EXIT_SUCCESS
        }
        // A reachable store without the table has not been initialized yet
        Err(e) => {
            println!("⚠️  Could not count mappings: {e}");
            println!("   Run any anonymize or mappings command to create the schema.");
            println!();
            exit_code_for(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_memory_store() {
        let store = MappingStore::in_memory();
        assert_eq!(report(&store).await, EXIT_SUCCESS);
    }
}
