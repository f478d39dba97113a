//! PostgreSQL row models
//!
//! Maps `item_master_source_log` rows to and from [`AuditEntry`], and
//! describes the operations staged until commit.

use crate::domain::{AuditEntry, AuditId, AuditStoreError, Result, ValidationStatus};
use chrono::{DateTime, Utc};
use tokio_postgres::Row;

pub const INSERT_SQL: &str = r#"
    INSERT INTO item_master_source_log (
        id, sku, source_model, validation_status, common_model,
        errors, is_sent_to_sqs, created_at
    )
    VALUES ($1, $2, $3::text::jsonb, $4, $5::text::jsonb, $6, $7, $8)
"#;

pub const BULK_SET_SENT_SQL: &str = r#"
    UPDATE item_master_source_log
    SET is_sent_to_sqs = $2, errors = $3, created_at = $4
    WHERE id = ANY($1)
"#;

pub const UPDATE_ONE_SQL: &str = r#"
    UPDATE item_master_source_log
    SET is_sent_to_sqs = $2, errors = $3, created_at = $4
    WHERE id = $1
"#;

pub const SELECT_BY_IDS_SQL: &str = r#"
    SELECT id, sku, source_model::text AS source_model, validation_status,
           common_model::text AS common_model, errors, is_sent_to_sqs, created_at
    FROM item_master_source_log
    WHERE id = ANY($1)
    ORDER BY id
"#;

pub const RESERVE_IDS_SQL: &str = r#"
    SELECT nextval(pg_get_serial_sequence('item_master_source_log', 'id'))
    FROM generate_series(1, $1::int4)
"#;

/// Row shape of `item_master_source_log`
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRow {
    pub id: i64,
    pub sku: String,
    pub source_model: String,
    pub validation_status: String,
    pub common_model: String,
    pub errors: Option<String>,
    pub is_sent_to_sqs: bool,
    pub created_at: DateTime<Utc>,
}

impl AuditRow {
    /// Build a row for insertion under a reserved id
    pub fn from_entry(id: AuditId, entry: &AuditEntry) -> Self {
        Self {
            id: id.value(),
            sku: entry.sku.clone(),
            source_model: entry.source_model.clone(),
            validation_status: entry.validation_status.as_str().to_string(),
            common_model: entry.common_model.clone(),
            errors: entry.errors.clone(),
            is_sent_to_sqs: entry.is_sent,
            created_at: entry.created_at,
        }
    }

    pub fn from_row(row: &Row) -> Result<Self> {
        let column_err =
            |e: tokio_postgres::Error| AuditStoreError::QueryFailed(format!("Unexpected row shape: {e}"));

        Ok(Self {
            id: row.try_get("id").map_err(column_err)?,
            sku: row.try_get("sku").map_err(column_err)?,
            source_model: row.try_get("source_model").map_err(column_err)?,
            validation_status: row.try_get("validation_status").map_err(column_err)?,
            common_model: row.try_get("common_model").map_err(column_err)?,
            errors: row.try_get("errors").map_err(column_err)?,
            is_sent_to_sqs: row.try_get("is_sent_to_sqs").map_err(column_err)?,
            created_at: row.try_get("created_at").map_err(column_err)?,
        })
    }

    pub fn into_entry(self) -> AuditEntry {
        AuditEntry {
            id: Some(AuditId::new(self.id)),
            sku: self.sku,
            source_model: self.source_model,
            validation_status: ValidationStatus::parse(&self.validation_status),
            common_model: self.common_model,
            errors: self.errors,
            is_sent: self.is_sent_to_sqs,
            created_at: self.created_at,
        }
    }
}

/// A mutation waiting for commit
#[derive(Debug, Clone, PartialEq)]
pub enum StagedOp {
    Insert(AuditRow),
    BulkSetSent {
        ids: Vec<i64>,
        sent: bool,
        error: Option<String>,
        at: DateTime<Utc>,
    },
    UpdateOne {
        id: i64,
        sent: bool,
        error: Option<String>,
        at: DateTime<Utc>,
    },
}

impl StagedOp {
    pub fn kind(&self) -> &'static str {
        match self {
            StagedOp::Insert(_) => "insert",
            StagedOp::BulkSetSent { .. } => "bulk_set_sent",
            StagedOp::UpdateOne { .. } => "update_one",
        }
    }
}
