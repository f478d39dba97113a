//! Collaborator construction from configuration

use crate::adapters::catalog::{CatalogSource, SnowflakeCatalog};
use crate::adapters::database::AuditStore;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::queue::{MessageQueue, SqsQueue};
use crate::config::SkuSyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the catalog source
pub fn create_catalog(config: &SkuSyncConfig) -> Result<Arc<dyn CatalogSource>> {
    let catalog = SnowflakeCatalog::new(config.catalog.clone())?;
    tracing::debug!(
        account = %config.catalog.account_url,
        table = %config.catalog.table,
        "Snowflake catalog created"
    );
    Ok(Arc::new(catalog))
}

/// Create the audit store and make sure its schema exists
pub async fn create_audit_store(config: &SkuSyncConfig) -> Result<Arc<dyn AuditStore>> {
    let client = PostgreSQLClient::new(config.postgresql.clone())?;
    let adapter = PostgreSQLAdapter::new(client);
    adapter.ensure_schema().await?;
    tracing::debug!(connection = %adapter.client().connection_string_safe(), "PostgreSQL audit store created");
    Ok(Arc::new(adapter))
}

/// Create the message queue client
pub async fn create_message_queue(config: &SkuSyncConfig) -> Result<Arc<dyn MessageQueue>> {
    let queue = SqsQueue::new(&config.queue).await?;
    Ok(Arc::new(queue))
}
