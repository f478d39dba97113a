//! Audit log entries
//!
//! One [`AuditEntry`] is written for every record a run processes. Entries
//! are append-only; only the send flag, the error text and the timestamp
//! change after a publish attempt.

use super::ids::AuditId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Empty JSON object, the default for the canonical payload column
pub const EMPTY_MODEL: &str = "{}";

/// Outcome of validating a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationStatus {
    Valid,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "Valid",
            ValidationStatus::Invalid => "Invalid",
        }
    }

    /// Parses the stored column value; anything unrecognised is `Invalid`
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("valid") {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted record of one processing attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Assigned by the audit store on append
    pub id: Option<AuditId>,

    pub sku: String,

    /// Raw record as JSON
    pub source_model: String,

    pub validation_status: ValidationStatus,

    /// Canonical record as JSON, `{}` until a canonical record exists
    pub common_model: String,

    pub errors: Option<String>,

    pub is_sent: bool,

    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates an unsent entry stamped with the current time
    pub fn new(
        sku: impl Into<String>,
        source_model: impl Into<String>,
        validation_status: ValidationStatus,
        errors: Option<String>,
    ) -> Self {
        Self {
            id: None,
            sku: sku.into(),
            source_model: source_model.into(),
            validation_status,
            common_model: EMPTY_MODEL.to_string(),
            errors,
            is_sent: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation_status == ValidationStatus::Valid
    }

    /// Applies a send result: flag, error text, and a refreshed timestamp
    pub fn mark_sent(&mut self, sent: bool, error: Option<String>) {
        self.is_sent = sent;
        self.errors = error;
        self.created_at = Utc::now();
    }
}
