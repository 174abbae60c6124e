//! Mapping repository factory
//!
//! Selects the storage backend named in the `[store]` configuration section.

use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLMappingRepository};
use crate::anonymization::store::{InMemoryRepository, MappingRepository, MappingStore};
use crate::config::schema::{StoreBackend, StoreConfig};
use crate::domain::{MasqueradeError, Result};
use std::sync::Arc;

/// Create the mapping repository for the configured backend
///
/// The repository is not contacted; use
/// [`MappingRepository::test_connection`] to check reachability.
///
/// # Errors
///
/// Returns a configuration error if the backend's section is missing, or
/// the backend's own construction error.
pub async fn create_mapping_repository(
    config: &StoreConfig,
) -> Result<Arc<dyn MappingRepository>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory mapping repository");
            Ok(Arc::new(InMemoryRepository::new()) as Arc<dyn MappingRepository>)
        }
        StoreBackend::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                MasqueradeError::Configuration(
                    "store.postgresql section is required when store.backend = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL mapping repository");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Ok(Arc::new(PostgreSQLMappingRepository::new(client)) as Arc<dyn MappingRepository>)
        }
    }
}

/// Create a [`MappingStore`] with its schema in place
///
/// # Errors
///
/// Fails with `StoreUnavailable` when the backend cannot be reached.
pub async fn create_mapping_store(config: &StoreConfig) -> Result<MappingStore> {
    let repository = create_mapping_repository(config).await?;
    repository.ensure_schema().await?;
    tracing::debug!(backend = repository.backend(), "Mapping store ready");
    Ok(MappingStore::new(repository))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            postgresql: None,
        };
        let store = create_mapping_store(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_postgresql_backend_requires_section() {
        let config = StoreConfig {
            backend: StoreBackend::PostgreSQL,
            postgresql: None,
        };
        let err = create_mapping_repository(&config).await.err().unwrap();
        assert!(matches!(err, MasqueradeError::Configuration(_)));
    }
}
