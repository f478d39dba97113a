//! Required-field validation
//!
//! Every required field is inspected on every call so the error text always
//! names all missing fields, string fields first, then numeric fields.

use crate::domain::audit::{AuditEntry, ValidationStatus};
use crate::domain::record::{has_text, RawRecord};
use crate::domain::Result;

/// Prefix of the validation error text
pub const MISSING_FIELDS_PREFIX: &str = "Missing required fields: ";

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    /// `None` when valid
    pub error: Option<String>,
}

fn required_strings(raw: &RawRecord) -> [(&'static str, &Option<String>); 12] {
    [
        ("Barcode", &raw.barcode),
        ("ProductTitle", &raw.product_title),
        ("Sku", &raw.sku),
        ("Hts", &raw.hts),
        ("CountryOfOrigin", &raw.country_of_origin),
        ("Size", &raw.size),
        ("Color", &raw.color),
        ("Brand", &raw.brand),
        ("FabricContent", &raw.fabric_content),
        ("FabricComposition", &raw.fabric_composition),
        ("Gender", &raw.gender),
        ("InventorySyncFlag", &raw.inventory_sync_flag),
    ]
}

fn required_numbers(raw: &RawRecord) -> [(&'static str, Option<f64>); 2] {
    [("Price", raw.price), ("LandedCost", raw.landed_cost)]
}

/// Checks all required fields of a raw record
///
/// Blank strings count as missing. Numeric fields only need to be present;
/// zero is accepted.
pub fn validate(raw: &RawRecord) -> Validation {
    let missing: Vec<&str> = required_strings(raw)
        .into_iter()
        .filter(|(_, value)| !has_text(value))
        .map(|(name, _)| name)
        .chain(
            required_numbers(raw)
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name),
        )
        .collect();

    if missing.is_empty() {
        Validation {
            is_valid: true,
            error: None,
        }
    } else {
        Validation {
            is_valid: false,
            error: Some(format!("{MISSING_FIELDS_PREFIX}{}", missing.join(", "))),
        }
    }
}

/// Builds the audit entry for a validated record
///
/// The raw record is serialized as the source payload; the canonical payload
/// stays at its empty default.
pub fn build_audit_entry(raw: &RawRecord, validation: &Validation) -> Result<AuditEntry> {
    let source_model = serde_json::to_string(raw)?;
    let status = if validation.is_valid {
        ValidationStatus::Valid
    } else {
        ValidationStatus::Invalid
    };

    Ok(AuditEntry::new(
        raw.sku.clone().unwrap_or_default(),
        source_model,
        status,
        validation.error.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::EMPTY_MODEL;

    fn complete_record() -> RawRecord {
        RawRecord {
            barcode: Some("0123456789012".to_string()),
            product_title: Some("Linen Shirt".to_string()),
            sku: Some("LS-001-WHT-M".to_string()),
            hts: Some("6205200000".to_string()),
            country_of_origin: Some("VN".to_string()),
            size: Some("M".to_string()),
            color: Some("White".to_string()),
            brand: Some("Acme".to_string()),
            fabric_content: Some("Linen".to_string()),
            fabric_composition: Some("100% Linen".to_string()),
            gender: Some("Men".to_string()),
            inventory_sync_flag: Some("Y".to_string()),
            price: Some(59.0),
            landed_cost: Some(12.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_is_valid() {
        let result = validate(&complete_record());
        assert!(result.is_valid);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_zero_price_is_present() {
        let mut record = complete_record();
        record.price = Some(0.0);
        assert!(validate(&record).is_valid);
    }

    #[test]
    fn test_lists_every_missing_field_in_order() {
        let result = validate(&RawRecord::default());
        assert!(!result.is_valid);
        assert_eq!(
            result.error.as_deref(),
            Some(
                "Missing required fields: Barcode, ProductTitle, Sku, Hts, CountryOfOrigin, \
                 Size, Color, Brand, FabricContent, FabricComposition, Gender, \
                 InventorySyncFlag, Price, LandedCost"
            )
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut record = complete_record();
        record.color = Some("   ".to_string());
        record.landed_cost = None;

        let result = validate(&record);
        assert_eq!(
            result.error.as_deref(),
            Some("Missing required fields: Color, LandedCost")
        );
    }

    #[test]
    fn test_build_audit_entry() {
        let record = complete_record();
        let validation = validate(&record);
        let entry = build_audit_entry(&record, &validation).unwrap();

        assert_eq!(entry.sku, "LS-001-WHT-M");
        assert_eq!(entry.validation_status, ValidationStatus::Valid);
        assert_eq!(entry.common_model, EMPTY_MODEL);
        assert!(!entry.is_sent);
        assert!(entry.source_model.contains("\"ProductTitle\":\"Linen Shirt\""));
    }
}
