//! PostgreSQL audit store
//!
//! Stores one row per processed record in `item_master_source_log`.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{AuditRow, StagedOp};
