//! PostgreSQL client implementation
//!
//! Pooled connections with a per-statement timeout. Pool failures surface
//! as [`MasqueradeError::StoreUnavailable`]; failed statements as
//! [`MasqueradeError::Database`].

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{MasqueradeError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for the mapping store
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// The pool connects lazily; call [`Self::test_connection`] to verify
    /// the server is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed or the pool
    /// cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                MasqueradeError::Configuration(format!(
                    "Invalid PostgreSQL connection string: {e}"
                ))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                MasqueradeError::Configuration(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Run `SELECT 1` on a pooled connection
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| MasqueradeError::StoreUnavailable(format!("Connection test failed: {e}")))?;

        tracing::info!(target = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Apply the schema migration; every statement is idempotent
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        let migration_sql = include_str!("../../../migrations/001_pii_mappings.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| MasqueradeError::Database(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    pub async fn get_connection(&self) -> Result<Object> {
        let client = self.pool.get().await.map_err(|e| {
            MasqueradeError::StoreUnavailable(format!("Failed to get connection from pool: {e}"))
        })?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.batch_execute(&timeout_query).await.map_err(|e| {
            MasqueradeError::StoreUnavailable(format!("Failed to set statement timeout: {e}"))
        })?;

        Ok(client)
    }

    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| MasqueradeError::Database(format!("Query failed: {e}")))
    }

    /// Execute a query expected to return zero or one row
    pub async fn query_opt(
        &self,
        query: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>> {
        let client = self.get_connection().await?;
        client
            .query_opt(query, params)
            .await
            .map_err(|e| MasqueradeError::Database(format!("Query failed: {e}")))
    }

    pub async fn query_one(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Row> {
        let client = self.get_connection().await?;
        client
            .query_one(query, params)
            .await
            .map_err(|e| MasqueradeError::Database(format!("Query failed: {e}")))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.get_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| MasqueradeError::Database(format!("Statement execution failed: {e}")))
    }

    /// Connection target with credentials removed
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret())
    }

    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn redact_connection_string(connection_string: &str) -> String {
    match connection_string.rsplit_once('@') {
        Some((_, target)) => format!("postgresql://***@{target}"),
        None => "postgresql://***".to_string(),
    }
}
