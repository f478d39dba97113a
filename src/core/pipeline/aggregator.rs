//! Result aggregation and audit reconciliation
//!
//! After a publish pass the audit log is brought in line with what actually
//! reached the queue, and a detail row is produced for every record.

use crate::adapters::database::AuditStore;
use crate::core::pipeline::report::RecordDetail;
use crate::domain::{AuditId, ProcessedItem, PublishOutcome, Result};
use std::collections::HashMap;

/// Record publish outcomes in the audit store
///
/// Successes are flagged sent in one bulk update. Failures are re-read,
/// stamped with their error and updated one by one. Everything commits as a
/// single unit of work, and applying the same outcomes again leaves the rows
/// unchanged apart from their timestamps.
///
/// # Errors
///
/// Propagates audit store failures, including a failed commit.
pub async fn reconcile(store: &dyn AuditStore, outcomes: &[PublishOutcome]) -> Result<()> {
    if outcomes.is_empty() {
        return Ok(());
    }

    let (succeeded, failed): (Vec<&PublishOutcome>, Vec<&PublishOutcome>) =
        outcomes.iter().partition(|o| o.success);

    if !succeeded.is_empty() {
        let ids: Vec<AuditId> = succeeded.iter().map(|o| o.audit_id).collect();
        store.bulk_set_sent(&ids, true, None).await?;
    }

    if !failed.is_empty() {
        let errors: HashMap<AuditId, &str> = failed
            .iter()
            .map(|o| (o.audit_id, o.error.as_str()))
            .collect();
        let ids: Vec<AuditId> = errors.keys().copied().collect();

        let mut entries = store.find_by_ids(&ids).await?;
        if entries.len() != ids.len() {
            tracing::warn!(
                expected = ids.len(),
                found = entries.len(),
                "Some failed publishes have no committed audit entry"
            );
        }

        for entry in &mut entries {
            let error = entry
                .id
                .and_then(|id| errors.get(&id))
                .map(|e| e.to_string());
            entry.mark_sent(false, error);
            store.update_one(entry).await?;
        }
    }

    store.commit().await?;

    tracing::debug!(
        sent = succeeded.len(),
        failed = failed.len(),
        "Reconciled publish outcomes"
    );
    Ok(())
}

/// One detail row per item
///
/// Valid items report their publish outcome. Invalid items were never
/// published and report their validation error.
pub fn build_report(items: &[ProcessedItem], outcomes: &[PublishOutcome]) -> Vec<RecordDetail> {
    let by_id: HashMap<AuditId, &PublishOutcome> =
        outcomes.iter().map(|o| (o.audit_id, o)).collect();

    items
        .iter()
        .map(|item| {
            let outcome = item.audit_id().and_then(|id| by_id.get(&id));
            let was_sent = outcome.map(|o| o.success).unwrap_or(false);
            let error = if item.is_valid {
                outcome.map(|o| o.error.clone()).unwrap_or_default()
            } else {
                item.entry.errors.clone().unwrap_or_default()
            };

            RecordDetail {
                sku: item.entry.sku.clone(),
                is_valid: item.is_valid,
                was_sent,
                error,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditEntry, CanonicalRecord, ValidationStatus};

    fn item(id: i64, sku: &str, valid: bool) -> ProcessedItem {
        let status = if valid {
            ValidationStatus::Valid
        } else {
            ValidationStatus::Invalid
        };
        let errors = (!valid).then(|| "Missing required fields: Price".to_string());
        let mut entry = AuditEntry::new(sku, "{}", status, errors);
        entry.id = Some(AuditId::new(id));
        if valid {
            ProcessedItem::valid(entry, CanonicalRecord::default())
        } else {
            ProcessedItem::invalid(entry)
        }
    }

    #[test]
    fn test_build_report_uses_the_right_error() {
        let items = vec![item(1, "A", true), item(2, "B", true), item(3, "C", false)];
        let outcomes = vec![
            PublishOutcome::failed(AuditId::new(2), "Send failed: throttled"),
            PublishOutcome::succeeded(AuditId::new(1)),
        ];

        let details = build_report(&items, &outcomes);
        assert_eq!(details.len(), 3);

        assert_eq!(details[0].sku, "A");
        assert!(details[0].was_sent);
        assert!(details[0].error.is_empty());

        assert!(!details[1].was_sent);
        assert_eq!(details[1].error, "Send failed: throttled");

        assert!(!details[2].is_valid);
        assert!(!details[2].was_sent);
        assert_eq!(details[2].error, "Missing required fields: Price");
    }

    #[test]
    fn test_build_report_valid_without_outcome() {
        let details = build_report(&[item(1, "A", true)], &[]);
        assert!(!details[0].was_sent);
        assert!(details[0].error.is_empty());
    }
}
