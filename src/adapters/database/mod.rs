//! Audit store abstraction layer
//!
//! The pipeline only talks to [`AuditStore`]; the PostgreSQL implementation
//! lives in [`crate::adapters::postgresql`].

pub mod traits;

pub use traits::AuditStore;
