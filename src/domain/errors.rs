//! Domain error types
//!
//! This module defines the error hierarchy for SkuSync.
//! Collaborator errors are wrapped in their own enums and never expose
//! third-party driver or SDK types.

use thiserror::Error;

/// Main SkuSync error type
///
/// This is the primary error type used throughout the application.
/// Per-record failures never surface here; only infrastructure and
/// request-level failures do.
#[derive(Debug, Error)]
pub enum SkuSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Catalog source errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Audit store errors
    #[error("Audit store error: {0}")]
    AuditStore(#[from] AuditStoreError),

    /// Message queue errors
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Malformed trigger or request payload
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl SkuSyncError {
    /// Whether this error means a backing store could not be reached
    ///
    /// The invocation layer reports these as "Database connection error".
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            SkuSyncError::Catalog(CatalogError::ConnectionFailed(_))
                | SkuSyncError::AuditStore(AuditStoreError::ConnectionFailed(_))
        )
    }
}

/// Catalog-specific errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to reach or authenticate against the catalog
    #[error("Failed to connect to catalog: {0}")]
    ConnectionFailed(String),

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Statement was rejected or failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Response could not be decoded
    #[error("Invalid response from catalog: {0}")]
    InvalidResponse(String),

    /// Statement did not finish in time
    #[error("Query timeout: {0}")]
    Timeout(String),
}

/// Audit store errors
#[derive(Debug, Error)]
pub enum AuditStoreError {
    /// Failed to obtain a connection
    #[error("Failed to connect to audit store: {0}")]
    ConnectionFailed(String),

    /// A read or id reservation failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The staged unit of work could not be committed
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// Store returned a different number of ids than entries appended
    #[error("Id reservation mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: usize, actual: usize },
}

/// Message queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Delivery to the queue failed and may succeed on another attempt
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// The queue refused the message; retrying cannot help
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// Queue client could not be built
    #[error("Queue client configuration failed: {0}")]
    Configuration(String),

    /// Message body could not be produced
    #[error("Failed to serialize message: {0}")]
    Serialization(String),
}

impl QueueError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, QueueError::SendFailed(_))
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for SkuSyncError {
    fn from(err: std::io::Error) -> Self {
        SkuSyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SkuSyncError {
    fn from(err: serde_json::Error) -> Self {
        SkuSyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SkuSyncError {
    fn from(err: toml::de::Error) -> Self {
        SkuSyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
