//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | batch interrupted by a shutdown signal |
//! | 2 | configuration error |
//! | 3 | invalid input |
//! | 4 | mapping store unavailable |
//! | 5 | fatal error |

pub mod anonymize;
pub mod entity_types;
pub mod init;
pub mod mappings;
pub mod stats;
pub mod status;
pub mod validate;

use crate::adapters::database::create_mapping_store;
use crate::anonymization::store::MappingStore;
use crate::config::{load_config, MasqueradeConfig};
use crate::domain::MasqueradeError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INTERRUPTED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_INVALID_INPUT: i32 = 3;
pub const EXIT_STORE_UNAVAILABLE: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error returned by the library
pub fn exit_code_for(error: &MasqueradeError) -> i32 {
    match error {
        MasqueradeError::Configuration(_) => EXIT_CONFIG_ERROR,
        MasqueradeError::InvalidInput(_) | MasqueradeError::NotFound(_) => EXIT_INVALID_INPUT,
        e if e.is_store_failure() => EXIT_STORE_UNAVAILABLE,
        _ => EXIT_FATAL,
    }
}

/// Load the configuration, reporting failures on stderr
pub(crate) fn load_or_report(config_path: &str) -> Result<MasqueradeConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(config_path = %config_path, error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration file: {config_path}");
        eprintln!("   Error: {e}");
        EXIT_CONFIG_ERROR
    })
}

/// Open the configured mapping store, reporting failures on stderr
pub(crate) async fn open_store_or_report(config: &MasqueradeConfig) -> Result<MappingStore, i32> {
    create_mapping_store(&config.store).await.map_err(|e| {
        tracing::error!(
            backend = config.store.backend.as_str(),
            error = %e,
            "Failed to open mapping store"
        );
        eprintln!("❌ Failed to open mapping store");
        eprintln!("   Error: {e}");
        exit_code_for(&e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InputError;
    use test_case::test_case;

    #[test_case(MasqueradeError::Configuration("x".into()), EXIT_CONFIG_ERROR ; "configuration")]
    #[test_case(MasqueradeError::InvalidInput(InputError::EmptyText), EXIT_INVALID_INPUT ; "invalid input")]
    #[test_case(MasqueradeError::NotFound("7".into()), EXIT_INVALID_INPUT ; "not found")]
    #[test_case(MasqueradeError::StoreUnavailable("down".into()), EXIT_STORE_UNAVAILABLE ; "store unavailable")]
    #[test_case(MasqueradeError::Database("bad sql".into()), EXIT_STORE_UNAVAILABLE ; "database")]
    #[test_case(MasqueradeError::Io("disk".into()), EXIT_FATAL ; "io")]
    fn test_exit_code_for(error: MasqueradeError, expected: i32) {
        assert_eq!(exit_code_for(&error), expected);
    }

    #[test]
    fn test_load_or_report_missing_file() {
        assert_eq!(
            load_or_report("does-not-exist.toml").unwrap_err(),
            EXIT_CONFIG_ERROR
        );
    }
}
