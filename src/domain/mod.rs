//! Domain models and types for SkuSync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`Sku`], [`AuditId`])
//! - **Records** ([`RawRecord`], [`CanonicalRecord`], [`AuditEntry`])
//! - **Pipeline bundles** ([`ProcessedItem`], [`PublishOutcome`])
//! - **Error types** ([`SkuSyncError`], [`CatalogError`], [`AuditStoreError`], [`QueueError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, SkuSyncError>`]:
//!
//! ```rust
//! use skusync::domain::{Result, Sku, SkuSyncError};
//!
//! fn first_sku(raw: &str) -> Result<Sku> {
//!     Sku::parse_list(raw)
//!         .into_iter()
//!         .next()
//!         .ok_or_else(|| SkuSyncError::InvalidRequest("no SKUs given".to_string()))
//! }
//!
//! assert!(first_sku("A1,B2").is_ok());
//! assert!(first_sku(" , ").is_err());
//! ```

pub mod audit;
pub mod canonical;
pub mod errors;
pub mod ids;
pub mod processed;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use audit::{AuditEntry, ValidationStatus};
pub use canonical::CanonicalRecord;
pub use errors::{AuditStoreError, CatalogError, QueueError, SkuSyncError};
pub use ids::{AuditId, Sku};
pub use processed::{ProcessedItem, PublishOutcome};
pub use record::RawRecord;
pub use result::Result;
