//! External system integrations for SkuSync.
//!
//! - [`catalog`] - Item catalog source (Snowflake SQL API)
//! - [`database`] - Audit store abstraction
//! - [`postgresql`] - PostgreSQL audit store
//! - [`queue`] - Downstream message queue (Amazon SQS)
//!
//! The pipeline only sees the traits. [`factory`] builds the concrete
//! implementations from a loaded [`SkuSyncConfig`](crate::config::SkuSyncConfig),
//! and tests substitute in-memory ones.

pub mod catalog;
pub mod database;
pub mod factory;
pub mod postgresql;
pub mod queue;

pub use catalog::CatalogSource;
pub use database::AuditStore;
pub use factory::{create_audit_store, create_catalog, create_message_queue};
pub use queue::MessageQueue;
