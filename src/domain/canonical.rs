//! Canonical item model
//!
//! The normalized, downstream-ready representation of a valid catalog
//! record. This is the message body published to the queue and the
//! `common_model` payload stored in the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency tag applied to every price and cost line
pub const DEFAULT_CURRENCY: &str = "USD";

/// Normalized item representation
///
/// Absent scalars are omitted from the JSON form. List fields are always
/// emitted, except `alternateBarcodes` which only appears when populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub china_hts_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_of_origin_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gs1_barcode: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_barcodes: Option<Vec<AlternateBarcode>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hts_tariff_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_commodity_code: Option<String>,

    #[serde(default)]
    pub prices: Vec<PriceLine>,

    #[serde(default)]
    pub costs: Vec<PriceLine>,

    #[serde(default)]
    pub categories: Vec<Category>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub images: Vec<Image>,

    #[serde(default)]
    pub dates: Vec<DateInfo>,
}

impl CanonicalRecord {
    /// SKU label for logs, `"Unknown"` when absent
    pub fn sku_label(&self) -> &str {
        self.sku.as_deref().unwrap_or("Unknown")
    }

    /// Compact JSON form used for the queue body and the audit payload
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Kind of a price or cost line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    List,
    Unit,
    Landed,
}

/// One typed monetary amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLine {
    pub value: f64,
    #[serde(rename = "type")]
    pub price_type: PriceType,
    pub currency: String,
}

impl PriceLine {
    pub fn new(value: f64, price_type: PriceType) -> Self {
        Self {
            value,
            price_type,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlternateBarcode {
    pub value: String,
    #[serde(rename = "type")]
    pub barcode_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub path: String,
    pub source: String,
}

/// Flat attribute, id to value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub size_type: String,
    pub url: String,
}

/// Per-system timestamp
///
/// A creation entry serializes as `{"system", "createdAt"}` and an update
/// entry as `{"system", "lastUpdatedAt"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInfo {
    Created {
        system: String,
        #[serde(rename = "createdAt")]
        timestamp: DateTime<Utc>,
    },
    Updated {
        system: String,
        #[serde(rename = "lastUpdatedAt")]
        timestamp: DateTime<Utc>,
    },
}

impl DateInfo {
    pub fn system(&self) -> &str {
        match self {
            DateInfo::Created { system, .. } | DateInfo::Updated { system, .. } => system,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DateInfo::Created { timestamp, .. } | DateInfo::Updated { timestamp, .. } => *timestamp,
        }
    }
}
