//! Consistent mapping store
//!
//! Maps a one-way fingerprint of `(original value, entity type)` to a
//! synthetic substitute. The original value is hashed before it reaches a
//! backend and is never persisted.
//!
//! Backends implement [`MappingRepository`]; [`MappingStore`] layers the
//! get-or-create protocol and input checks on top:
//!
//! 1. Atomically bump `use_count`/`last_used` on an existing row and return it.
//! 2. On a miss, generate a substitute and insert it if absent.
//! 3. If a concurrent writer won the insert, re-read once and return the winner.

pub mod memory;

use crate::anonymization::models::EntityType;
use crate::domain::{InputError, MasqueradeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use memory::InMemoryRepository;

/// Maximum length of an operator-supplied substitute, in characters
pub const MAX_SUBSTITUTE_LENGTH: usize = 500;

/// A persisted substitution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mapping {
    pub id: i64,
    pub fingerprint: String,
    pub entity_type: EntityType,
    pub substitute: String,
    pub first_seen: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    pub use_count: i64,
}

/// Row to insert on first encounter of a value
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub fingerprint: String,
    pub entity_type: EntityType,
    pub substitute: String,
}

/// Result of an insert-if-absent
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The row was written by this call
    Inserted(Mapping),
    /// Another writer already holds the `(fingerprint, entity_type)` pair
    Conflict,
}

/// One page of mappings, newest first
#[derive(Debug, Clone, Serialize)]
pub struct MappingPage {
    pub mappings: Vec<Mapping>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Filter for time-range exports
///
/// Bounds apply to `first_seen`; `since` is inclusive, `until` exclusive.
#[derive(Debug, Clone, Default)]
pub struct TimeRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub entity_type: Option<EntityType>,
}

impl TimeRange {
    pub fn contains(&self, mapping: &Mapping) -> bool {
        self.since.map_or(true, |since| mapping.first_seen >= since)
            && self.until.map_or(true, |until| mapping.first_seen < until)
            && self
                .entity_type
                .as_ref()
                .map_or(true, |t| &mapping.entity_type == t)
    }
}

/// Per-type usage figures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityTypeStatistics {
    /// Distinct original values seen
    pub unique_values: u64,
    /// Sum of `use_count` over the type's mappings
    pub substitutions: u64,
}

/// Aggregate figures over the whole store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingStatistics {
    pub total_mappings: u64,
    pub total_substitutions: u64,
    pub by_entity_type: BTreeMap<String, EntityTypeStatistics>,
    pub oldest_mapping: Option<DateTime<Utc>>,
    pub newest_mapping: Option<DateTime<Utc>>,
}

impl MappingStatistics {
    /// Build statistics from a full scan of the mappings
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = &'a Mapping>) -> Self {
        let mut stats = Self::default();
        for mapping in mappings {
            let uses = u64::try_from(mapping.use_count).unwrap_or(0);
            stats.total_mappings += 1;
            stats.total_substitutions += uses;

            let entry = stats
                .by_entity_type
                .entry(mapping.entity_type.as_str().to_string())
                .or_default();
            entry.unique_values += 1;
            entry.substitutions += uses;

            stats.oldest_mapping = Some(
                stats
                    .oldest_mapping
                    .map_or(mapping.first_seen, |t| t.min(mapping.first_seen)),
            );
            stats.newest_mapping = Some(
                stats
                    .newest_mapping
                    .map_or(mapping.first_seen, |t| t.max(mapping.first_seen)),
            );
        }
        stats
    }
}

/// Storage backend for mappings
///
/// Every method is a single short operation. Implementations must keep
/// `(fingerprint, entity_type)` unique under concurrent writers and must
/// report an unreachable backend as [`MasqueradeError::StoreUnavailable`].
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Backend name for logs and status output
    fn backend(&self) -> &str;

    /// Check that the backend is reachable
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they don't exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Read a mapping without touching its counters
    async fn lookup(&self, fingerprint: &str, entity_type: &EntityType) -> Result<Option<Mapping>>;

    /// Atomically increment `use_count`, set `last_used` and return the row
    async fn record_use(
        &self,
        fingerprint: &str,
        entity_type: &EntityType,
    ) -> Result<Option<Mapping>>;

    /// Insert with `use_count = 1` unless the pair already exists
    async fn insert_if_absent(&self, mapping: NewMapping) -> Result<InsertOutcome>;

    /// Page through mappings ordered by `first_seen` descending
    async fn list(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<&EntityType>,
    ) -> Result<MappingPage>;

    async fn get(&self, id: i64) -> Result<Option<Mapping>>;

    /// Replace the substitute of one mapping, returning `None` if it doesn't exist
    async fn update_substitute(&self, id: i64, substitute: &str) -> Result<Option<Mapping>>;

    /// Delete one mapping, returning whether it existed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Delete every mapping, returning how many were removed
    async fn delete_all(&self) -> Result<u64>;

    /// Mappings first seen inside `range`, oldest first
    async fn list_by_time_range(&self, range: &TimeRange) -> Result<Vec<Mapping>>;

    async fn statistics(&self) -> Result<MappingStatistics>;

    async fn count(&self) -> Result<u64>;
}

/// Compute the store key for a value
///
/// SHA-256 over `"{byte length of value}:{value}|{ENTITY_TYPE}"`, lowercase
/// hex. The length prefix keeps the encoding unambiguous when either part
/// contains `|`.
pub fn fingerprint(value: &str, entity_type: &EntityType) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.len().to_string().as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
    hasher.update(b"|");
    hasher.update(entity_type.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Get-or-create front end over a [`MappingRepository`]
#[derive(Clone)]
pub struct MappingStore {
    repository: Arc<dyn MappingRepository>,
}

impl MappingStore {
    pub fn new(repository: Arc<dyn MappingRepository>) -> Self {
        Self { repository }
    }

    /// Store backed by a fresh in-memory repository
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    pub fn repository(&self) -> &Arc<dyn MappingRepository> {
        &self.repository
    }

    pub fn backend(&self) -> &str {
        self.repository.backend()
    }

    /// Return the substitute for `value`, creating it on first encounter
    ///
    /// `generate` receives the fingerprint and is only called on a miss. The
    /// boolean is `true` when this call created the mapping.
    pub async fn get_or_create<F>(
        &self,
        value: &str,
        entity_type: &EntityType,
        generate: F,
    ) -> Result<(String, bool)>
    where
        F: FnOnce(&str) -> String + Send,
    {
        let fingerprint = fingerprint(value, entity_type);

        if let Some(existing) = self.repository.record_use(&fingerprint, entity_type).await? {
            return Ok((existing.substitute, false));
        }

        let substitute = generate(&fingerprint);
        let outcome = self
            .repository
            .insert_if_absent(NewMapping {
                fingerprint: fingerprint.clone(),
                entity_type: entity_type.clone(),
                substitute,
            })
            .await?;

        match outcome {
            InsertOutcome::Inserted(mapping) => {
                tracing::debug!(
                    entity_type = %entity_type,
                    mapping_id = mapping.id,
                    "Created mapping"
                );
                Ok((mapping.substitute, true))
            }
            InsertOutcome::Conflict => {
                tracing::debug!(entity_type = %entity_type, "Insert lost a race, re-reading mapping");
                self.repository
                    .record_use(&fingerprint, entity_type)
                    .await?
                    .map(|winner| (winner.substitute, false))
                    .ok_or_else(|| {
                        MasqueradeError::StoreUnavailable(
                            "mapping disappeared after insert conflict".to_string(),
                        )
                    })
            }
        }
    }

    /// Read the mapping for `value` without counting a use
    pub async fn lookup(&self, value: &str, entity_type: &EntityType) -> Result<Option<Mapping>> {
        self.repository
            .lookup(&fingerprint(value, entity_type), entity_type)
            .await
    }

    pub async fn list(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<&EntityType>,
    ) -> Result<MappingPage> {
        self.repository.list(limit, offset, entity_type).await
    }

    /// Fetch one mapping, failing with `NotFound` when absent
    pub async fn get(&self, id: i64) -> Result<Mapping> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| MasqueradeError::NotFound(id.to_string()))
    }

    /// Override the substitute of an existing mapping
    pub async fn update_substitute(&self, id: i64, substitute: &str) -> Result<Mapping> {
        let length = substitute.chars().count();
        if length == 0 || length > MAX_SUBSTITUTE_LENGTH {
            return Err(InputError::InvalidSubstitute {
                max: MAX_SUBSTITUTE_LENGTH,
            }
            .into());
        }

        let updated = self
            .repository
            .update_substitute(id, substitute)
            .await?
            .ok_or_else(|| MasqueradeError::NotFound(id.to_string()))?;
        tracing::info!(mapping_id = id, "Substitute overridden");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.repository.delete(id).await? {
            tracing::info!(mapping_id = id, "Mapping deleted");
            Ok(())
        } else {
            Err(MasqueradeError::NotFound(id.to_string()))
        }
    }

    pub async fn delete_all(&self) -> Result<u64> {
        let removed = self.repository.delete_all().await?;
        tracing::warn!(removed, "All mappings deleted");
        Ok(removed)
    }

    pub async fn export(&self, range: &TimeRange) -> Result<Vec<Mapping>> {
        self.repository.list_by_time_range(range).await
    }

    pub async fn statistics(&self) -> Result<MappingStatistics> {
        self.repository.statistics().await
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository.count().await
    }

    pub async fn test_connection(&self) -> Result<()> {
        self.repository.test_connection().await
    }
}
