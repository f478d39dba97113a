//! Catalog source abstraction

use crate::domain::{RawRecord, Result, Sku};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only access to the item catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the records for the given SKUs
    ///
    /// An empty slice returns an empty vector without touching the catalog.
    /// SKUs with no matching row are simply absent from the result.
    async fn fetch_by_ids(&self, ids: &[Sku]) -> Result<Vec<RawRecord>>;

    /// Fetch records updated in `[from, to)`, newest first, at most `limit`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidArgument` when `limit` is zero or
    /// `from` is not before `to`.
    async fn fetch_by_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<RawRecord>>;

    /// Human-readable name used in logs
    fn source_name(&self) -> &str;
}
