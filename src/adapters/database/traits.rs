//! Audit store abstraction
//!
//! The audit store keeps one row per processed record. Mutations are staged
//! and only become visible once `commit` succeeds, so a pipeline stage can
//! group its writes into a single unit of work.

use crate::domain::{AuditEntry, AuditId, Result};
use async_trait::async_trait;

/// Persistence capability for audit entries
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Test the connection to the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Stage inserts for `entries`
    ///
    /// Identifiers are reserved immediately and returned in input order, so
    /// callers can refer to the rows before they are committed.
    async fn append_all(&self, entries: &[AuditEntry]) -> Result<Vec<AuditId>>;

    /// Stage one update setting the sent flag and error text on every id
    ///
    /// The row timestamp is refreshed as part of the update.
    async fn bulk_set_sent(&self, ids: &[AuditId], sent: bool, error: Option<String>) -> Result<()>;

    /// Stage an update of the sent flag, error text and timestamp of one entry
    ///
    /// # Errors
    ///
    /// Returns `SkuSyncError::Validation` if the entry has no id.
    async fn update_one(&self, entry: &AuditEntry) -> Result<()>;

    /// Read committed entries by id
    ///
    /// Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[AuditId]) -> Result<Vec<AuditEntry>>;

    /// Apply every staged operation atomically, in staging order
    ///
    /// The stage is cleared whether or not the commit succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuditStoreError::CommitFailed` when the transaction fails.
    async fn commit(&self) -> Result<()>;

    /// Human-readable name used in logs
    fn store_name(&self) -> &str;
}
