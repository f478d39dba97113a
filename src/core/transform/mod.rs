//! Validation and canonical transformation
//!
//! Pure functions from a [`RawRecord`] to a [`ProcessedItem`]: no I/O and no
//! shared state, so records can be transformed on any worker in any order.
//!
//! - [`validate`] checks required fields and builds the audit entry
//! - [`canonical`] maps a valid record to the canonical model

pub mod canonical;
pub mod validate;

pub use canonical::map_to_canonical;
pub use validate::{build_audit_entry, validate, Validation};

use crate::domain::record::RawRecord;
use crate::domain::{ProcessedItem, Result};

/// Validate a raw record and, when valid, map it to the canonical model
///
/// Valid entries carry the canonical JSON as their `common_model`.
///
/// # Examples
///
/// ```
/// use skusync::core::transform::transform_record;
/// use skusync::domain::RawRecord;
///
/// let item = transform_record(RawRecord::default()).unwrap();
/// assert!(!item.is_valid);
/// assert!(item.canonical.is_none());
/// ```
pub fn transform_record(raw: RawRecord) -> Result<ProcessedItem> {
    let validation = validate(&raw);
    let mut entry = build_audit_entry(&raw, &validation)?;

    if !validation.is_valid {
        return Ok(ProcessedItem::invalid(entry));
    }

    let canonical = map_to_canonical(&raw);
    entry.common_model = canonical.to_json()?;
    Ok(ProcessedItem::valid(entry, canonical))
}
