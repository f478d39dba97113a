//! PostgreSQL implementation of [`AuditStore`]
//!
//! Inserts and updates are held in memory until `commit`, which replays
//! them inside one transaction. Identifiers are taken from the table's
//! sequence up front so callers can address rows that are not yet written.

use crate::adapters::database::traits::AuditStore;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::{
    AuditRow, StagedOp, BULK_SET_SENT_SQL, INSERT_SQL, RESERVE_IDS_SQL, SELECT_BY_IDS_SQL,
    UPDATE_ONE_SQL,
};
use crate::domain::{AuditEntry, AuditId, AuditStoreError, Result, SkuSyncError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// PostgreSQL-backed audit log
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
    staged: Mutex<Vec<StagedOp>>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self::new_with_arc(Arc::new(client))
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Self {
        Self {
            client,
            staged: Mutex::new(Vec::new()),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    /// Create the audit table if needed
    pub async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    /// Number of operations waiting for commit
    pub async fn staged_len(&self) -> usize {
        self.staged.lock().await.len()
    }

    async fn reserve_ids(&self, count: usize) -> Result<Vec<AuditId>> {
        let requested = i32::try_from(count).map_err(|_| {
            SkuSyncError::Validation(format!("Cannot reserve {count} audit ids at once"))
        })?;

        let rows = self.client.query(RESERVE_IDS_SQL, &[&requested]).await?;
        let ids = rows
            .iter()
            .map(|row| {
                row.try_get::<_, i64>(0).map(AuditId::new).map_err(|e| {
                    SkuSyncError::from(AuditStoreError::QueryFailed(format!(
                        "Failed to read reserved id: {e}"
                    )))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if ids.len() != count {
            return Err(AuditStoreError::IdMismatch {
                expected: count,
                actual: ids.len(),
            }
            .into());
        }

        Ok(ids)
    }
}

#[async_trait]
impl AuditStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn append_all(&self, entries: &[AuditEntry]) -> Result<Vec<AuditId>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.reserve_ids(entries.len()).await?;

        let mut staged = self.staged.lock().await;
        staged.extend(
            ids.iter()
                .zip(entries)
                .map(|(id, entry)| StagedOp::Insert(AuditRow::from_entry(*id, entry))),
        );

        tracing::debug!(count = ids.len(), "Staged audit inserts");
        Ok(ids)
    }

    async fn bulk_set_sent(&self, ids: &[AuditId], sent: bool, error: Option<String>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        self.staged.lock().await.push(StagedOp::BulkSetSent {
            ids: ids.iter().map(|id| id.value()).collect(),
            sent,
            error,
            at: Utc::now(),
        });
        Ok(())
    }

    async fn update_one(&self, entry: &AuditEntry) -> Result<()> {
        let id = entry.id.ok_or_else(|| {
            SkuSyncError::Validation(format!("Audit entry for SKU '{}' has no id", entry.sku))
        })?;

        self.staged.lock().await.push(StagedOp::UpdateOne {
            id: id.value(),
            sent: entry.is_sent,
            error: entry.errors.clone(),
            at: entry.created_at,
        });
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[AuditId]) -> Result<Vec<AuditEntry>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i64> = ids.iter().map(|id| id.value()).collect();
        let rows = self.client.query(SELECT_BY_IDS_SQL, &[&raw_ids]).await?;

        rows.iter()
            .map(|row| AuditRow::from_row(row).map(AuditRow::into_entry))
            .collect()
    }

    async fn commit(&self) -> Result<()> {
        let ops = std::mem::take(&mut *self.staged.lock().await);
        if ops.is_empty() {
            return Ok(());
        }

        let commit_err = |e: tokio_postgres::Error| -> SkuSyncError {
            AuditStoreError::CommitFailed(e.to_string()).into()
        };

        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(commit_err)?;

        for op in &ops {
            let result = match op {
                StagedOp::Insert(row) => {
                    tx.execute(
                        INSERT_SQL,
                        &[
                            &row.id,
                            &row.sku,
                            &row.source_model,
                            &row.validation_status,
                            &row.common_model,
                            &row.errors,
                            &row.is_sent_to_sqs,
                            &row.created_at,
                        ],
                    )
                    .await
                }
                StagedOp::BulkSetSent {
                    ids,
                    sent,
                    error,
                    at,
                } => tx.execute(BULK_SET_SENT_SQL, &[ids, sent, error, at]).await,
                StagedOp::UpdateOne {
                    id,
                    sent,
                    error,
                    at,
                } => tx.execute(UPDATE_ONE_SQL, &[id, sent, error, at]).await,
            };

            if let Err(e) = result {
                tracing::error!(operation = op.kind(), error = %e, "Audit commit failed, rolling back");
                return Err(commit_err(e));
            }
        }

        tx.commit().await.map_err(commit_err)?;
        tracing::debug!(operations = ops.len(), "Committed audit operations");
        Ok(())
    }

    fn store_name(&self) -> &str {
        "postgresql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{secret_string, PostgreSQLConfig};
    use crate::domain::ValidationStatus;

    fn adapter() -> PostgreSQLAdapter {
        let client = PostgreSQLClient::new(PostgreSQLConfig {
            connection_string: secret_string("postgresql://sync:pw@localhost:5432/skusync".to_string()),
            max_connections: 2,
            connection_timeout_seconds: 1,
            statement_timeout_seconds: 5,
            ssl_mode: "disable".to_string(),
        })
        .unwrap();
        PostgreSQLAdapter::new(client)
    }

    #[tokio::test]
    async fn test_staging_without_database() {
        let store = adapter();

        let mut entry = AuditEntry::new("SKU-1", "{}", ValidationStatus::Valid, None);
        entry.id = Some(AuditId::new(7));
        entry.mark_sent(false, Some("throttled".to_string()));

        store.update_one(&entry).await.unwrap();
        store
            .bulk_set_sent(&[AuditId::new(8), AuditId::new(9)], true, None)
            .await
            .unwrap();
        store.bulk_set_sent(&[], true, None).await.unwrap();

        assert_eq!(store.staged_len().await, 2);
    }

    #[tokio::test]
    async fn test_update_one_requires_id() {
        let store = adapter();
        let entry = AuditEntry::new("SKU-1", "{}", ValidationStatus::Valid, None);
        let err = store.update_one(&entry).await.unwrap_err();
        assert!(matches!(err, SkuSyncError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_calls_skip_database() {
        let store = adapter();
        assert!(store.append_all(&[]).await.unwrap().is_empty());
        assert!(store.find_by_ids(&[]).await.unwrap().is_empty());
        store.commit().await.unwrap();
    }
}
