//! Raw catalog record
//!
//! The item as retrieved from the catalog, before validation. Every field
//! is optional because the source table enforces nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unvalidated item data fetched from the catalog
///
/// Serializes with PascalCase field names; that form is what the audit log
/// stores as the source payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecord {
    pub brand: Option<String>,
    pub region: Option<String>,
    pub sku: Option<String>,
    pub status: Option<String>,
    pub barcode: Option<String>,
    pub secondary_barcode: Option<String>,
    pub product_title: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub weight: Option<f64>,
    pub volume: Option<f64>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub gender: Option<String>,
    pub fabric_content: Option<String>,
    pub fabric_composition: Option<String>,
    pub country_of_origin: Option<String>,
    pub hts: Option<String>,
    pub china_hts: Option<String>,
    pub velocity_code: Option<String>,
    pub fast_mover: Option<String>,
    pub description: Option<String>,
    pub product_image_url: Option<String>,
    pub product_image_url_pos1: Option<String>,
    pub product_image_url_pos2: Option<String>,
    pub product_image_url_pos3: Option<String>,
    pub landed_cost: Option<f64>,
    pub cost: Option<f64>,
    pub price: Option<f64>,
    pub latest_po_number: Option<String>,
    pub latest_po_status: Option<String>,
    pub latest_po_created_date: Option<DateTime<Utc>>,
    pub latest_po_expected_date: Option<DateTime<Utc>>,
    pub wh1_name: Option<String>,
    pub wh1_available_qty: Option<i64>,
    pub wh2_name: Option<String>,
    pub wh2_available_qty: Option<i64>,
    pub wh3_name: Option<String>,
    pub wh3_available_qty: Option<i64>,
    pub created_at_shopify: Option<DateTime<Utc>>,
    pub created_at_snowflake: Option<DateTime<Utc>>,
    pub updated_at_snowflake: Option<DateTime<Utc>>,
    pub present_in_xb_flag: Option<bool>,
    pub inventory_sync_flag: Option<String>,
    pub third_barcode: Option<String>,
}

impl RawRecord {
    /// SKU label used in logs and reports, `"Unknown"` when absent
    pub fn sku_label(&self) -> String {
        self.sku
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// True when the optional string holds at least one non-whitespace character
pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_pascal_case_names() {
        let record = RawRecord {
            sku: Some("SKU-1".to_string()),
            product_image_url_pos1: Some("https://cdn/1.jpg".to_string()),
            wh2_available_qty: Some(7),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Sku"], "SKU-1");
        assert_eq!(json["ProductImageUrlPos1"], "https://cdn/1.jpg");
        assert_eq!(json["Wh2AvailableQty"], 7);
        assert!(json["Barcode"].is_null());
    }

    #[test]
    fn test_sku_label() {
        let mut record = RawRecord::default();
        assert_eq!(record.sku_label(), "Unknown");

        record.sku = Some("  ".to_string());
        assert_eq!(record.sku_label(), "Unknown");

        record.sku = Some("ABC".to_string());
        assert_eq!(record.sku_label(), "ABC");
    }

    #[test]
    fn test_has_text() {
        assert!(!has_text(&None));
        assert!(!has_text(&Some(" \n".to_string())));
        assert!(has_text(&Some("x".to_string())));
    }
}
