//! PostgreSQL client implementation
//!
//! Owns the connection pool and applies the statement timeout to every
//! connection it hands out.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{AuditStoreError, Result, SkuSyncError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for the audit log
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be built.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let conn_str: &str = config.connection_string.expose_secret().as_ref();
        let mut pg_config: tokio_postgres::Config = conn_str.parse().map_err(|e| {
            SkuSyncError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
        })?;
        pg_config.ssl_mode(ssl_mode(&config.ssl_mode));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.ssl_mode == "disable" {
            Manager::from_config(pg_config, NoTls, manager_config)
        } else {
            Manager::from_config(pg_config, tls_connector(&config.ssl_mode)?, manager_config)
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                AuditStoreError::ConnectionFailed(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| AuditStoreError::ConnectionFailed(format!("Connection test failed: {e}")))?;

        tracing::info!(target = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Create the audit log table and its indexes if they don't exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        let migration_sql = include_str!("../../../migrations/001_audit_log.sql");

        client
            .batch_execute(migration_sql)
            .await
            .map_err(|e| AuditStoreError::QueryFailed(format!("Failed to execute migration: {e}")))?;

        tracing::info!("PostgreSQL audit schema initialized");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<Object> {
        let client = self.pool.get().await.map_err(|e| {
            AuditStoreError::ConnectionFailed(format!("Failed to get connection from pool: {e}"))
        })?;

        client
            .batch_execute(&format!(
                "SET statement_timeout = {}",
                self.config.statement_timeout_seconds * 1000
            ))
            .await
            .map_err(|e| {
                AuditStoreError::QueryFailed(format!("Failed to set statement timeout: {e}"))
            })?;

        Ok(client)
    }

    /// Execute a query and return rows
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;

        client
            .query(query, params)
            .await
            .map_err(|e| AuditStoreError::QueryFailed(format!("Query failed: {e}")).into())
    }

    /// Connection target with credentials removed
    pub fn connection_string_safe(&self) -> String {
        redact(self.config.connection_string.expose_secret().as_ref())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

fn ssl_mode(mode: &str) -> SslMode {
    match mode {
        "disable" => SslMode::Disable,
        "require" | "verify-ca" | "verify-full" => SslMode::Require,
        _ => SslMode::Prefer,
    }
}

fn tls_connector(mode: &str) -> Result<MakeTlsConnector> {
    let verify = matches!(mode, "verify-ca" | "verify-full");
    let connector = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(!verify)
        .danger_accept_invalid_hostnames(mode != "verify-full")
        .build()
        .map_err(|e| SkuSyncError::Configuration(format!("Failed to build TLS connector: {e}")))?;
    Ok(MakeTlsConnector::new(connector))
}

/// Connection string with credentials stripped, safe to print
pub fn redact(connection_string: &str) -> String {
    connection_string
        .rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{host}"))
        .unwrap_or_else(|| "postgresql://***".to_string())
}
