//! Message queue abstraction

use crate::domain::{CanonicalRecord, QueueError};
use async_trait::async_trait;

/// Single-message publish capability
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Publish one canonical record and return the queue-assigned message id
    ///
    /// Errors are returned as-is; retrying is the caller's concern.
    async fn send(&self, record: &CanonicalRecord) -> std::result::Result<String, QueueError>;

    /// Human-readable name used in logs
    fn queue_name(&self) -> &str;
}
