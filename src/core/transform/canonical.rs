//! Canonical mapping
//!
//! Builds a [`CanonicalRecord`] from a raw record through a fixed sequence
//! of independent steps. Each step fills a disjoint part of the output, so
//! any step can be skipped without affecting the others.

use crate::domain::canonical::{
    AlternateBarcode, Attribute, CanonicalRecord, Category, DateInfo, Image, Link, PriceLine,
    PriceType,
};
use crate::domain::record::{has_text, RawRecord};

/// Exact length of a full tariff code
pub const TARIFF_CODE_LENGTH: usize = 10;

/// Length of a commodity code prefix
pub const COMMODITY_CODE_LENGTH: usize = 6;

/// 2024-01-01T00:00:00Z; purchase orders on or after it carry a GS1 barcode
pub const BARCODE_CUTOFF_EPOCH_SECS: i64 = 1_704_067_200;

pub const ALTERNATE_BARCODE_TYPE: &str = "alternate";
pub const BRAND_CATEGORY_SOURCE: &str = "brand";
pub const AKA_CATEGORY_SOURCE: &str = "aka";
pub const SHOPIFY_US_LINK_SOURCE: &str = "Shopify US";
pub const ORIGINAL_SIZE_TYPE: &str = "original_size";
pub const SHOPIFY_SYSTEM: &str = "Shopify";
pub const SNOWFLAKE_SYSTEM: &str = "snowflake";

/// Step-by-step builder for [`CanonicalRecord`]
#[derive(Debug, Default)]
pub struct CanonicalBuilder {
    item: CanonicalRecord,
}

impl CanonicalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic_info(mut self, raw: &RawRecord) -> Self {
        self.item.sku = raw.sku.clone();
        self.item.name = raw.product_title.clone();
        self.item.description = raw.description.clone();
        self.item.china_hts_code = raw.china_hts.clone();
        self.item.country_of_origin_code = raw
            .country_of_origin
            .clone()
            .filter(|code| code.chars().count() == 2);
        self
    }

    /// Tariff code and commodity code are mutually exclusive
    pub fn with_classification(mut self, raw: &RawRecord) -> Self {
        if let Some(hts) = raw.hts.as_deref() {
            let len = hts.chars().count();
            if len == TARIFF_CODE_LENGTH {
                self.item.hts_tariff_code = Some(hts.to_string());
            } else if len >= COMMODITY_CODE_LENGTH {
                self.item.hs_commodity_code =
                    Some(hts.chars().take(COMMODITY_CODE_LENGTH).collect());
            }
        }
        self
    }

    /// Primary and alternate barcode are gated on the latest PO date
    pub fn with_barcode(mut self, raw: &RawRecord) -> Self {
        let Some(po_date) = raw.latest_po_created_date else {
            return self;
        };
        let on_or_after_cutoff = po_date.timestamp() >= BARCODE_CUTOFF_EPOCH_SECS;

        if on_or_after_cutoff && has_text(&raw.barcode) {
            self.item.gs1_barcode = raw.barcode.clone();
        }

        if !on_or_after_cutoff {
            if let Some(secondary) = raw.secondary_barcode.as_deref().filter(|b| !b.trim().is_empty()) {
                self.item.alternate_barcodes = Some(vec![AlternateBarcode {
                    value: secondary.to_string(),
                    barcode_type: ALTERNATE_BARCODE_TYPE.to_string(),
                }]);
            }
        }
        self
    }

    pub fn with_prices(mut self, raw: &RawRecord) -> Self {
        self.item.prices = [
            (raw.price, PriceType::List),
            (raw.cost, PriceType::Unit),
            (raw.landed_cost, PriceType::Landed),
        ]
        .into_iter()
        .filter_map(|(value, kind)| amount(value).map(|v| PriceLine::new(v, kind)))
        .collect();
        self
    }

    pub fn with_costs(mut self, raw: &RawRecord) -> Self {
        self.item.costs = [(raw.cost, PriceType::Unit), (raw.landed_cost, PriceType::Landed)]
            .into_iter()
            .filter_map(|(value, kind)| amount(value).map(|v| PriceLine::new(v, kind)))
            .collect();
        self
    }

    pub fn with_categories(mut self, raw: &RawRecord) -> Self {
        self.item.categories = [
            (&raw.product_type, BRAND_CATEGORY_SOURCE),
            (&raw.category, AKA_CATEGORY_SOURCE),
        ]
        .into_iter()
        .filter_map(|(path, source)| {
            path.as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| Category {
                    path: p.to_string(),
                    source: source.to_string(),
                })
        })
        .collect();
        self
    }

    /// Brand feeds two attribute ids, so duplicates by source are expected
    pub fn with_attributes(mut self, raw: &RawRecord) -> Self {
        let mappings: [(&Option<String>, &str); 10] = [
            (&raw.size, "size"),
            (&raw.color, "color"),
            (&raw.brand, "brand_name"),
            (&raw.fabric_content, "fabric_content"),
            (&raw.fabric_composition, "fabric_composition"),
            (&raw.gender, "gender"),
            (&raw.velocity_code, "velocity_code"),
            (&raw.fast_mover, "fast_mover"),
            (&raw.brand, "brand_entity"),
            (&raw.inventory_sync_flag, "inventory_sync_enabled"),
        ];

        self.item.attributes = mappings
            .into_iter()
            .filter(|(value, _)| has_text(value))
            .filter_map(|(value, id)| {
                value.as_ref().map(|v| Attribute {
                    id: id.to_string(),
                    value: v.clone(),
                })
            })
            .collect();
        self
    }

    pub fn with_links(mut self, raw: &RawRecord) -> Self {
        self.item.links = raw
            .product_image_url
            .iter()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Link {
                source: SHOPIFY_US_LINK_SOURCE.to_string(),
                url: url.clone(),
            })
            .collect();
        self
    }

    pub fn with_images(mut self, raw: &RawRecord) -> Self {
        self.item.images = [
            &raw.product_image_url_pos1,
            &raw.product_image_url_pos2,
            &raw.product_image_url_pos3,
        ]
        .into_iter()
        .flatten()
        .filter(|url| !url.trim().is_empty())
        .map(|url| Image {
            size_type: ORIGINAL_SIZE_TYPE.to_string(),
            url: url.clone(),
        })
        .collect();
        self
    }

    pub fn with_dates(mut self, raw: &RawRecord) -> Self {
        let created = [
            (raw.created_at_shopify, SHOPIFY_SYSTEM),
            (raw.created_at_snowflake, SNOWFLAKE_SYSTEM),
        ]
        .into_iter()
        .filter_map(|(ts, system)| {
            ts.map(|timestamp| DateInfo::Created {
                system: system.to_string(),
                timestamp,
            })
        });

        let updated = raw.updated_at_snowflake.map(|timestamp| DateInfo::Updated {
            system: SNOWFLAKE_SYSTEM.to_string(),
            timestamp,
        });

        self.item.dates = created.chain(updated).collect();
        self
    }

    pub fn build(self) -> CanonicalRecord {
        self.item
    }
}

fn amount(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Runs every mapping step in order
pub fn map_to_canonical(raw: &RawRecord) -> CanonicalRecord {
    CanonicalBuilder::new()
        .with_basic_info(raw)
        .with_classification(raw)
        .with_barcode(raw)
        .with_prices(raw)
        .with_costs(raw)
        .with_categories(raw)
        .with_attributes(raw)
        .with_links(raw)
        .with_images(raw)
        .with_dates(raw)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use test_case::test_case;

    fn record_with_hts(hts: &str) -> RawRecord {
        RawRecord {
            hts: Some(hts.to_string()),
            ..Default::default()
        }
    }

    #[test_case("1234567890", Some("1234567890"), None ; "tariff length")]
    #[test_case("123456", None, Some("123456") ; "commodity length")]
    #[test_case("12345678", None, Some("123456") ; "between lengths")]
    #[test_case("12345678901", None, Some("123456") ; "longer than tariff")]
    #[test_case("12345", None, None ; "too short")]
    fn test_classification(hts: &str, tariff: Option<&str>, commodity: Option<&str>) {
        let item = CanonicalBuilder::new()
            .with_classification(&record_with_hts(hts))
            .build();
        assert_eq!(item.hts_tariff_code.as_deref(), tariff);
        assert_eq!(item.hs_commodity_code.as_deref(), commodity);
    }

    #[test_case(Some((2023, 12, 31)), false, true ; "before cutoff")]
    #[test_case(Some((2024, 1, 1)), true, false ; "on cutoff")]
    #[test_case(Some((2024, 6, 15)), true, false ; "after cutoff")]
    #[test_case(None, false, false ; "no date")]
    fn test_barcode_gating(date: Option<(i32, u32, u32)>, primary: bool, alternate: bool) {
        let raw = RawRecord {
            barcode: Some("0123456789012".to_string()),
            secondary_barcode: Some("987654321".to_string()),
            latest_po_created_date: date
                .map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        let item = CanonicalBuilder::new().with_barcode(&raw).build();
        assert_eq!(item.gs1_barcode.is_some(), primary);
        assert_eq!(item.alternate_barcodes.is_some(), alternate);
        if alternate {
            let barcodes = item.alternate_barcodes.unwrap();
            assert_eq!(barcodes.len(), 1);
            assert_eq!(barcodes[0].value, "987654321");
            assert_eq!(barcodes[0].barcode_type, "alternate");
        }
    }

    #[test]
    fn test_country_code_requires_two_chars() {
        let mut raw = RawRecord {
            country_of_origin: Some("CN".to_string()),
            ..Default::default()
        };
        assert_eq!(
            map_to_canonical(&raw).country_of_origin_code.as_deref(),
            Some("CN")
        );

        raw.country_of_origin = Some("CHN".to_string());
        assert!(map_to_canonical(&raw).country_of_origin_code.is_none());
    }

    #[test]
    fn test_prices_and_costs() {
        let raw = RawRecord {
            price: Some(40.0),
            cost: Some(10.0),
            landed_cost: Some(12.0),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        let kinds: Vec<PriceType> = item.prices.iter().map(|p| p.price_type).collect();
        assert_eq!(kinds, vec![PriceType::List, PriceType::Unit, PriceType::Landed]);
        assert!(item.prices.iter().all(|p| p.currency == "USD"));

        let cost_kinds: Vec<PriceType> = item.costs.iter().map(|p| p.price_type).collect();
        assert_eq!(cost_kinds, vec![PriceType::Unit, PriceType::Landed]);
    }

    #[test]
    fn test_missing_cost_is_skipped() {
        let raw = RawRecord {
            price: Some(40.0),
            landed_cost: Some(f64::NAN),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        assert_eq!(item.prices.len(), 1);
        assert!(item.costs.is_empty());
    }

    #[test]
    fn test_categories() {
        let raw = RawRecord {
            product_type: Some("Tops".to_string()),
            category: Some(String::new()),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        assert_eq!(item.categories.len(), 1);
        assert_eq!(item.categories[0].path, "Tops");
        assert_eq!(item.categories[0].source, "brand");
    }

    #[test]
    fn test_attributes_keep_order_and_duplicate_brand() {
        let raw = RawRecord {
            size: Some("L".to_string()),
            brand: Some("Acme".to_string()),
            gender: Some(" ".to_string()),
            inventory_sync_flag: Some("Y".to_string()),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        let ids: Vec<&str> = item.attributes.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["size", "brand_name", "brand_entity", "inventory_sync_enabled"]
        );
    }

    #[test]
    fn test_images_skip_blank_positions() {
        let raw = RawRecord {
            product_image_url: Some("https://cdn/main.jpg".to_string()),
            product_image_url_pos1: Some("https://cdn/1.jpg".to_string()),
            product_image_url_pos2: Some(String::new()),
            product_image_url_pos3: Some("https://cdn/3.jpg".to_string()),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        assert_eq!(item.links.len(), 1);
        assert_eq!(item.links[0].source, "Shopify US");

        let urls: Vec<&str> = item.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["https://cdn/1.jpg", "https://cdn/3.jpg"]);
        assert!(item.images.iter().all(|i| i.size_type == "original_size"));
    }

    #[test]
    fn test_dates_only_populated_timestamps() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap();
        let raw = RawRecord {
            created_at_snowflake: Some(ts),
            updated_at_snowflake: Some(ts),
            ..Default::default()
        };

        let item = map_to_canonical(&raw);
        assert_eq!(item.dates.len(), 2);
        assert!(matches!(item.dates[0], DateInfo::Created { .. }));
        assert_eq!(item.dates[0].system(), "snowflake");
        assert!(matches!(item.dates[1], DateInfo::Updated { .. }));
    }
}
