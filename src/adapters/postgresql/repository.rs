//! PostgreSQL mapping repository
//!
//! Uniqueness of `(fingerprint, entity_type)` is enforced by a unique index;
//! inserts use `ON CONFLICT DO NOTHING RETURNING` so a lost race comes back
//! as an empty result instead of an error. Use counting is a single
//! `UPDATE ... RETURNING` statement.

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::anonymization::models::EntityType;
use crate::anonymization::store::{
    EntityTypeStatistics, InsertOutcome, Mapping, MappingPage, MappingRepository,
    MappingStatistics, NewMapping, TimeRange,
};
use crate::domain::{MasqueradeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_postgres::Row;

const COLUMNS: &str = "id, fingerprint, entity_type, substitute, first_seen, last_used, use_count";

/// Mapping repository backed by the `pii_mappings` table
pub struct PostgreSQLMappingRepository {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLMappingRepository {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn mapping_from_row(row: &Row) -> Result<Mapping> {
    let read = |e: tokio_postgres::Error| MasqueradeError::Database(format!("Invalid mapping row: {e}"));
    let entity_type: String = row.try_get("entity_type").map_err(read)?;
    let fingerprint: String = row.try_get("fingerprint").map_err(read)?;

    Ok(Mapping {
        id: row.try_get("id").map_err(read)?,
        fingerprint: fingerprint.trim_end().to_string(),
        entity_type: EntityType::from(entity_type.as_str()),
        substitute: row.try_get("substitute").map_err(read)?,
        first_seen: row.try_get("first_seen").map_err(read)?,
        last_used: row.try_get("last_used").map_err(read)?,
        use_count: row.try_get("use_count").map_err(read)?,
    })
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl MappingRepository for PostgreSQLMappingRepository {
    fn backend(&self) -> &str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn lookup(&self, fingerprint: &str, entity_type: &EntityType) -> Result<Option<Mapping>> {
        let query = format!(
            "SELECT {COLUMNS} FROM pii_mappings WHERE fingerprint = $1 AND entity_type = $2"
        );
        self.client
            .query_opt(&query, &[&fingerprint, &entity_type.as_str()])
            .await?
            .as_ref()
            .map(mapping_from_row)
            .transpose()
    }

    async fn record_use(
        &self,
        fingerprint: &str,
        entity_type: &EntityType,
    ) -> Result<Option<Mapping>> {
        let query = format!(
            "UPDATE pii_mappings \
             SET use_count = use_count + 1, last_used = NOW() \
             WHERE fingerprint = $1 AND entity_type = $2 \
             RETURNING {COLUMNS}"
        );
        self.client
            .query_opt(&query, &[&fingerprint, &entity_type.as_str()])
            .await?
            .as_ref()
            .map(mapping_from_row)
            .transpose()
    }

    async fn insert_if_absent(&self, mapping: NewMapping) -> Result<InsertOutcome> {
        let query = format!(
            "INSERT INTO pii_mappings (fingerprint, entity_type, substitute, first_seen, last_used, use_count) \
             VALUES ($1, $2, $3, NOW(), NOW(), 1) \
             ON CONFLICT (fingerprint, entity_type) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let row = self
            .client
            .query_opt(
                &query,
                &[
                    &mapping.fingerprint,
                    &mapping.entity_type.as_str(),
                    &mapping.substitute,
                ],
            )
            .await?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(mapping_from_row(&row)?)),
            None => Ok(InsertOutcome::Conflict),
        }
    }

    async fn list(
        &self,
        limit: usize,
        offset: usize,
        entity_type: Option<&EntityType>,
    ) -> Result<MappingPage> {
        let type_filter: Option<&str> = entity_type.map(EntityType::as_str);

        let query = format!(
            "SELECT {COLUMNS} FROM pii_mappings \
             WHERE ($1::TEXT IS NULL OR entity_type = $1) \
             ORDER BY first_seen DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let rows = self
            .client
            .query(&query, &[&type_filter, &to_i64(limit), &to_i64(offset)])
            .await?;

        let total: i64 = self
            .client
            .query_one(
                "SELECT COUNT(*) FROM pii_mappings WHERE ($1::TEXT IS NULL OR entity_type = $1)",
                &[&type_filter],
            )
            .await?
            .get(0);

        Ok(MappingPage {
            mappings: rows.iter().map(mapping_from_row).collect::<Result<_>>()?,
            total: u64::try_from(total).unwrap_or(0),
            limit,
            offset,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Mapping>> {
        let query = format!("SELECT {COLUMNS} FROM pii_mappings WHERE id = $1");
        self.client
            .query_opt(&query, &[&id])
            .await?
            .as_ref()
            .map(mapping_from_row)
            .transpose()
    }

    async fn update_substitute(&self, id: i64, substitute: &str) -> Result<Option<Mapping>> {
        let query =
            format!("UPDATE pii_mappings SET substitute = $2 WHERE id = $1 RETURNING {COLUMNS}");
        self.client
            .query_opt(&query, &[&id, &substitute])
            .await?
            .as_ref()
            .map(mapping_from_row)
            .transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self
            .client
            .execute("DELETE FROM pii_mappings WHERE id = $1", &[&id])
            .await?;
        Ok(deleted > 0)
    }

    async fn delete_all(&self) -> Result<u64> {
        self.client.execute("DELETE FROM pii_mappings", &[]).await
    }

    async fn list_by_time_range(&self, range: &TimeRange) -> Result<Vec<Mapping>> {
        let type_filter: Option<&str> = range.entity_type.as_ref().map(EntityType::as_str);
        let query = format!(
            "SELECT {COLUMNS} FROM pii_mappings \
             WHERE ($1::TIMESTAMPTZ IS NULL OR first_seen >= $1) \
               AND ($2::TIMESTAMPTZ IS NULL OR first_seen < $2) \
               AND ($3::TEXT IS NULL OR entity_type = $3) \
             ORDER BY first_seen ASC, id ASC"
        );
        let rows = self
            .client
            .query(&query, &[&range.since, &range.until, &type_filter])
            .await?;
        rows.iter().map(mapping_from_row).collect()
    }

    async fn statistics(&self) -> Result<MappingStatistics> {
        let rows = self
            .client
            .query(
                "SELECT entity_type, COUNT(*) AS unique_values, \
                        COALESCE(SUM(use_count), 0)::BIGINT AS substitutions, \
                        MIN(first_seen) AS oldest, MAX(first_seen) AS newest \
                 FROM pii_mappings GROUP BY entity_type",
                &[],
            )
            .await?;

        let mut stats = MappingStatistics::default();
        for row in &rows {
            let entity_type: String = row.get("entity_type");
            let unique_values = u64::try_from(row.get::<_, i64>("unique_values")).unwrap_or(0);
            let substitutions = u64::try_from(row.get::<_, i64>("substitutions")).unwrap_or(0);
            let oldest: Option<DateTime<Utc>> = row.get("oldest");
            let newest: Option<DateTime<Utc>> = row.get("newest");

            stats.total_mappings += unique_values;
            stats.total_substitutions += substitutions;
            stats.by_entity_type.insert(
                entity_type,
                EntityTypeStatistics {
                    unique_values,
                    substitutions,
                },
            );
            stats.oldest_mapping = match (stats.oldest_mapping, oldest) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
            stats.newest_mapping = match (stats.newest_mapping, newest) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            };
        }
        Ok(stats)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = self
            .client
            .query_one("SELECT COUNT(*) FROM pii_mappings", &[])
            .await?
            .get(0);
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
