//! Entity-types command implementation
//!
//! Lists every entity type a recognizer can detect, with its enabled flag
//! and configured strategy. Does not touch the mapping store.

use super::{load_or_report, EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::anonymization::{AnonymizationEngine, EntityTypeInfo, MappingStore};
use clap::Args;

/// Arguments for the entity-types command
#[derive(Args, Debug, Default)]
pub struct EntityTypesArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

impl EntityTypesArgs {
    /// Execute the entity-types command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let mut anonymization = config.anonymization;
        anonymization.audit.enabled = false;
        let engine = match AnonymizationEngine::new(anonymization, MappingStore::in_memory()) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("❌ Failed to load recognizers");
                eprintln!("   Error: {e:#}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let types = engine.supported_entity_types();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&types)?);
        } else {
            print!("{}", render(&types));
        }
        Ok(EXIT_SUCCESS)
    }
}

fn render(types: &[EntityTypeInfo]) -> String {
    let mut out = format!(
        "{:<20} {:<8} {:<20} {}\n{}\n",
        "Entity Type",
        "Enabled",
        "Strategy",
        "Description",
        "-".repeat(90)
    );
    for info in types {
        out.push_str(&format!(
            "{:<20} {:<8} {:<20} {}\n",
            info.entity_type.as_str(),
            if info.enabled { "yes" } else { "no" },
            info.strategy,
            info.description
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::{AnonymizationConfig, EntityType};

    #[test]
    fn test_render_lists_builtin_types() {
        let mut config = AnonymizationConfig::default();
        config.audit.enabled = false;
        let engine = AnonymizationEngine::new(config, MappingStore::in_memory()).unwrap();

        let rendered = render(&engine.supported_entity_types());
        assert!(rendered.contains("EMAIL_ADDRESS"));
        assert!(rendered.contains("consistent_replace"));
        let person_line = rendered
            .lines()
            .find(|l| l.starts_with(EntityType::Person.as_str()))
            .unwrap();
        assert!(person_line.contains("yes"));
    }
}
