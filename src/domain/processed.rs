//! Per-record pipeline bundles

use super::audit::{AuditEntry, ValidationStatus, EMPTY_MODEL};
use super::canonical::CanonicalRecord;
use super::ids::AuditId;

/// Audit entry, optional canonical record, and validity flag for one record
///
/// `canonical` is present exactly when the entry is valid.
#[derive(Debug, Clone)]
pub struct ProcessedItem {
    pub entry: AuditEntry,
    pub canonical: Option<CanonicalRecord>,
    pub is_valid: bool,
}

impl ProcessedItem {
    pub fn invalid(entry: AuditEntry) -> Self {
        Self {
            entry,
            canonical: None,
            is_valid: false,
        }
    }

    pub fn valid(entry: AuditEntry, canonical: CanonicalRecord) -> Self {
        Self {
            entry,
            canonical: Some(canonical),
            is_valid: true,
        }
    }

    /// Item for a record whose transform failed unexpectedly
    pub fn failed(sku: impl Into<String>, message: &str) -> Self {
        let entry = AuditEntry::new(
            sku,
            EMPTY_MODEL,
            ValidationStatus::Invalid,
            Some(format!("Processing error: {message}")),
        );
        Self::invalid(entry)
    }

    /// Whether this item should go to the queue
    pub fn is_publishable(&self) -> bool {
        self.is_valid && self.canonical.is_some()
    }

    pub fn audit_id(&self) -> Option<AuditId> {
        self.entry.id
    }
}

/// Result of publishing one item, retries collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub audit_id: AuditId,
    pub success: bool,
    /// Empty on success
    pub error: String,
}

impl PublishOutcome {
    pub fn succeeded(audit_id: AuditId) -> Self {
        Self {
            audit_id,
            success: true,
            error: String::new(),
        }
    }

    pub fn failed(audit_id: AuditId, error: impl Into<String>) -> Self {
        Self {
            audit_id,
            success: false,
            error: error.into(),
        }
    }
}
