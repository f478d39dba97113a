//! Snowflake SQL API v2 catalog source
//!
//! Statements are submitted with positional bindings to
//! `POST {account}/api/v2/statements`. A `202` answer means the statement is
//! still running and is polled through its handle. Large results arrive in
//! partitions that are fetched one by one.

use super::traits::CatalogSource;
use crate::config::CatalogConfig;
use crate::domain::{CatalogError, RawRecord, Result, Sku};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Source columns, in select order
pub const ITEM_COLUMNS: [&str; 48] = [
    "BRAND",
    "REGION",
    "SKU",
    "STATUS",
    "BARCODE",
    "SECONDARY_BARCODE",
    "PRODUCT_TITLE",
    "COLOR",
    "SIZE",
    "WEIGHT",
    "VOLUME",
    "HEIGHT",
    "WIDTH",
    "LENGTH",
    "PRODUCT_TYPE",
    "CATEGORY",
    "GENDER",
    "FABRIC_CONTENT",
    "FABRIC_COMPOSITION",
    "COUNTRY_OF_ORIGIN",
    "HTS",
    "CHINA_HTS",
    "VELOCITY_CODE",
    "FAST_MOVER",
    "DESCRIPTION",
    "PRODUCT_IMAGE_URL",
    "PRODUCT_IMAGE_URL_POS_1",
    "PRODUCT_IMAGE_URL_POS_2",
    "PRODUCT_IMAGE_URL_POS_3",
    "LANDED_COST",
    "COST",
    "PRICE",
    "LATEST_PO_NUMBER",
    "LATEST_PO_STATUS",
    "LATEST_PO_CREATED_DATE",
    "LATEST_PO_EXPECTED_DATE",
    "WH_1_NAME",
    "WH_1_AVAILABLE_QTY",
    "WH_2_NAME",
    "WH_2_AVAILABLE_QTY",
    "WH_3_NAME",
    "WH_3_AVAILABLE_QTY",
    "CREATED_AT_SHOPIFY",
    "CREATED_AT_SNOWFLAKE",
    "UPDATED_AT_SNOWFLAKE",
    "PRESENT_IN_XB_FLAG",
    "INVENTORY_SYNC_FLAG",
    "THIRD_BARCODE",
];

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: String,
    timeout: u64,
    database: &'a str,
    schema: &'a str,
    warehouse: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    bindings: BTreeMap<String, Binding>,
}

#[derive(Debug, Serialize)]
struct Binding {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

impl Binding {
    fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "TEXT",
            value: value.into(),
        }
    }

    fn fixed(value: u32) -> Self {
        Self {
            kind: "FIXED",
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    #[serde(default)]
    statement_handle: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
    row_type: Vec<ColumnType>,
}

#[derive(Debug, Deserialize)]
struct ColumnType {
    name: String,
    #[serde(rename = "type", default)]
    column_type: String,
}

#[derive(Debug, Deserialize)]
struct PartitionResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

enum StatementState {
    Ready(StatementResponse),
    Running(String),
}

/// Catalog source backed by the Snowflake SQL API
pub struct SnowflakeCatalog {
    client: Client,
    config: CatalogConfig,
    statements_url: String,
}

impl SnowflakeCatalog {
    /// Create a new Snowflake catalog client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds + 10))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                CatalogError::ConnectionFailed(format!("Failed to build HTTP client: {e}"))
            })?;

        let statements_url = format!(
            "{}/api/v2/statements",
            config.account_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            config,
            statements_url,
        })
    }

    fn select_clause(&self) -> String {
        format!("SELECT {} FROM {}", ITEM_COLUMNS.join(", "), self.config.table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token: &str = self.config.token.expose_secret().as_ref();
        request
            .bearer_auth(token)
            .header("X-Snowflake-Authorization-Token-Type", &self.config.token_type)
            .header("Accept", "application/json")
    }

    async fn execute(&self, statement: String, bindings: Vec<Binding>) -> Result<Vec<RawRecord>> {
        let body = StatementRequest {
            statement,
            timeout: self.config.timeout_seconds,
            database: &self.config.database,
            schema: &self.config.schema,
            warehouse: &self.config.warehouse,
            role: self.config.role.as_deref(),
            bindings: bindings
                .into_iter()
                .enumerate()
                .map(|(i, b)| ((i + 1).to_string(), b))
                .collect(),
        };

        tracing::debug!(statement = %body.statement, bindings = body.bindings.len(), "Submitting Snowflake statement");

        let resp = self
            .authorize(self.client.post(&self.statements_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;

        let response = match read_state(resp).await? {
            StatementState::Ready(response) => response,
            StatementState::Running(handle) => self.wait_for(&handle).await?,
        };

        self.collect_rows(response).await
    }

    async fn wait_for(&self, handle: &str) -> Result<StatementResponse> {
        let max_polls = (self.config.timeout_seconds * 1000 / POLL_INTERVAL.as_millis() as u64).max(1);
        let url = format!("{}/{}", self.statements_url, handle);

        for poll in 1..=max_polls {
            tokio::time::sleep(POLL_INTERVAL).await;
            tracing::debug!(handle = %handle, poll, "Polling running Snowflake statement");

            let resp = self
                .authorize(self.client.get(&url))
                .send()
                .await
                .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;

            if let StatementState::Ready(response) = read_state(resp).await? {
                return Ok(response);
            }
        }

        Err(CatalogError::Timeout(format!(
            "Statement {handle} still running after {} seconds",
            self.config.timeout_seconds
        ))
        .into())
    }

    async fn collect_rows(&self, response: StatementResponse) -> Result<Vec<RawRecord>> {
        let meta = response.result_set_meta_data.ok_or_else(|| {
            CatalogError::InvalidResponse(format!(
                "Missing resultSetMetaData: {}",
                response.message.unwrap_or_default()
            ))
        })?;

        let mut rows = response.data;

        if meta.partition_info.len() > 1 {
            let handle = response.statement_handle.ok_or_else(|| {
                CatalogError::InvalidResponse("Partitioned result without statement handle".to_string())
            })?;
            for partition in 1..meta.partition_info.len() {
                rows.extend(self.fetch_partition(&handle, partition).await?);
            }
        }

        let reader = RowReader::new(&meta.row_type);
        rows.iter().map(|row| reader.decode(row)).collect()
    }

    async fn fetch_partition(&self, handle: &str, partition: usize) -> Result<Vec<Vec<Option<String>>>> {
        let url = format!("{}/{}", self.statements_url, handle);
        let resp = self
            .authorize(self.client.get(&url))
            .query(&[("partition", partition.to_string())])
            .send()
            .await
            .map_err(|e| CatalogError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::QueryFailed(format!(
                "Fetching partition {partition} failed with status {status}: {body}"
            ))
            .into());
        }

        let page: PartitionResponse = resp
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
        Ok(page.data)
    }
}

async fn read_state(resp: Response) -> Result<StatementState> {
    let status = resp.status();
    match status {
        StatusCode::OK => {
            let body = resp
                .json::<StatementResponse>()
                .await
                .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
            Ok(StatementState::Ready(body))
        }
        StatusCode::ACCEPTED => {
            let body = resp
                .json::<StatementResponse>()
                .await
                .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;
            let handle = body.statement_handle.ok_or_else(|| {
                CatalogError::InvalidResponse("202 response without statement handle".to_string())
            })?;
            Ok(StatementState::Running(handle))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            let body = resp.text().await.unwrap_or_default();
            Err(CatalogError::ConnectionFailed(format!(
                "Snowflake rejected credentials with status {status}: {body}"
            ))
            .into())
        }
        StatusCode::REQUEST_TIMEOUT => {
            Err(CatalogError::Timeout("Snowflake statement timed out".to_string()).into())
        }
        _ => {
            let body = resp.text().await.unwrap_or_default();
            Err(CatalogError::QueryFailed(format!(
                "Statement failed with status {status}: {body}"
            ))
            .into())
        }
    }
}

#[async_trait]
impl CatalogSource for SnowflakeCatalog {
    async fn fetch_by_ids(&self, ids: &[Sku]) -> Result<Vec<RawRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let statement = format!("{} WHERE SKU IN ({placeholders})", self.select_clause());
        let bindings = ids.iter().map(|sku| Binding::text(sku.as_str())).collect();

        let records = self.execute(statement, bindings).await?;
        tracing::info!(requested = ids.len(), found = records.len(), "Fetched catalog records by SKU");
        Ok(records)
    }

    async fn fetch_by_window(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<RawRecord>> {
        if limit == 0 {
            return Err(CatalogError::InvalidArgument("Limit must be greater than zero".to_string()).into());
        }
        if from >= to {
            return Err(CatalogError::InvalidArgument("FromDate must be less than ToDate".to_string()).into());
        }

        let statement = format!(
            "{} WHERE UPDATED_AT_SNOWFLAKE >= TO_TIMESTAMP_TZ(?) \
             AND UPDATED_AT_SNOWFLAKE < TO_TIMESTAMP_TZ(?) \
             ORDER BY UPDATED_AT_SNOWFLAKE DESC LIMIT ?",
            self.select_clause()
        );
        let bindings = vec![
            Binding::text(from.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Binding::text(to.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Binding::fixed(limit),
        ];

        let records = self.execute(statement, bindings).await?;
        tracing::info!(%from, %to, limit, found = records.len(), "Fetched catalog records by window");
        Ok(records)
    }

    fn source_name(&self) -> &str {
        "snowflake"
    }
}

/// Decodes Snowflake `jsonv2` rows by column name
struct RowReader {
    columns: HashMap<String, (usize, String)>,
}

impl RowReader {
    fn new(row_type: &[ColumnType]) -> Self {
        let columns = row_type
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.to_uppercase(), (i, c.column_type.to_lowercase())))
            .collect();
        Self { columns }
    }

    fn cell<'r>(&self, row: &'r [Option<String>], column: &str) -> Option<(&'r str, &str)> {
        let (index, kind) = self.columns.get(column)?;
        row.get(*index)?.as_deref().map(|v| (v, kind.as_str()))
    }

    fn text(&self, row: &[Option<String>], column: &str) -> Option<String> {
        self.cell(row, column).map(|(v, _)| v.to_string())
    }

    fn float(&self, row: &[Option<String>], column: &str) -> Result<Option<f64>> {
        self.cell(row, column)
            .map(|(v, _)| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| invalid_cell(column, v, e))
            })
            .transpose()
    }

    fn int(&self, row: &[Option<String>], column: &str) -> Result<Option<i64>> {
        self.cell(row, column)
            .map(|(v, _)| {
                let v = v.trim();
                v.parse::<i64>()
                    .or_else(|_| v.parse::<f64>().map(|f| f.trunc() as i64))
                    .map_err(|e| invalid_cell(column, v, e))
            })
            .transpose()
    }

    fn boolean(&self, row: &[Option<String>], column: &str) -> Result<Option<bool>> {
        self.cell(row, column)
            .map(|(v, _)| match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(invalid_cell(column, other, "not a boolean")),
            })
            .transpose()
    }

    fn timestamp(&self, row: &[Option<String>], column: &str) -> Result<Option<DateTime<Utc>>> {
        self.cell(row, column)
            .map(|(v, kind)| {
                let parsed = if kind == "date" {
                    v.trim()
                        .parse::<i64>()
                        .ok()
                        .and_then(|days| DateTime::from_timestamp(days * 86_400, 0))
                } else {
                    parse_epoch(v)
                };
                parsed.ok_or_else(|| invalid_cell(column, v, "not an epoch timestamp"))
            })
            .transpose()
    }

    fn decode(&self, row: &[Option<String>]) -> Result<RawRecord> {
        Ok(RawRecord {
            brand: self.text(row, "BRAND"),
            region: self.text(row, "REGION"),
            sku: self.text(row, "SKU"),
            status: self.text(row, "STATUS"),
            barcode: self.text(row, "BARCODE"),
            secondary_barcode: self.text(row, "SECONDARY_BARCODE"),
            product_title: self.text(row, "PRODUCT_TITLE"),
            color: self.text(row, "COLOR"),
            size: self.text(row, "SIZE"),
            weight: self.float(row, "WEIGHT")?,
            volume: self.float(row, "VOLUME")?,
            height: self.float(row, "HEIGHT")?,
            width: self.float(row, "WIDTH")?,
            length: self.float(row, "LENGTH")?,
            product_type: self.text(row, "PRODUCT_TYPE"),
            category: self.text(row, "CATEGORY"),
            gender: self.text(row, "GENDER"),
            fabric_content: self.text(row, "FABRIC_CONTENT"),
            fabric_composition: self.text(row, "FABRIC_COMPOSITION"),
            country_of_origin: self.text(row, "COUNTRY_OF_ORIGIN"),
            hts: self.text(row, "HTS"),
            china_hts: self.text(row, "CHINA_HTS"),
            velocity_code: self.text(row, "VELOCITY_CODE"),
            fast_mover: self.text(row, "FAST_MOVER"),
            description: self.text(row, "DESCRIPTION"),
            product_image_url: self.text(row, "PRODUCT_IMAGE_URL"),
            product_image_url_pos1: self.text(row, "PRODUCT_IMAGE_URL_POS_1"),
            product_image_url_pos2: self.text(row, "PRODUCT_IMAGE_URL_POS_2"),
            product_image_url_pos3: self.text(row, "PRODUCT_IMAGE_URL_POS_3"),
            landed_cost: self.float(row, "LANDED_COST")?,
            cost: self.float(row, "COST")?,
            price: self.float(row, "PRICE")?,
            latest_po_number: self.text(row, "LATEST_PO_NUMBER"),
            latest_po_status: self.text(row, "LATEST_PO_STATUS"),
            latest_po_created_date: self.timestamp(row, "LATEST_PO_CREATED_DATE")?,
            latest_po_expected_date: self.timestamp(row, "LATEST_PO_EXPECTED_DATE")?,
            wh1_name: self.text(row, "WH_1_NAME"),
            wh1_available_qty: self.int(row, "WH_1_AVAILABLE_QTY")?,
            wh2_name: self.text(row, "WH_2_NAME"),
            wh2_available_qty: self.int(row, "WH_2_AVAILABLE_QTY")?,
            wh3_name: self.text(row, "WH_3_NAME"),
            wh3_available_qty: self.int(row, "WH_3_AVAILABLE_QTY")?,
            created_at_shopify: self.timestamp(row, "CREATED_AT_SHOPIFY")?,
            created_at_snowflake: self.timestamp(row, "CREATED_AT_SNOWFLAKE")?,
            updated_at_snowflake: self.timestamp(row, "UPDATED_AT_SNOWFLAKE")?,
            present_in_xb_flag: self.boolean(row, "PRESENT_IN_XB_FLAG")?,
            inventory_sync_flag: self.text(row, "INVENTORY_SYNC_FLAG"),
            third_barcode: self.text(row, "THIRD_BARCODE"),
        })
    }
}

fn invalid_cell(column: &str, value: &str, reason: impl std::fmt::Display) -> crate::domain::SkuSyncError {
    CatalogError::InvalidResponse(format!("Column {column} value '{value}': {reason}")).into()
}

/// Parses `"<seconds>.<fraction>[ <tz offset>]"` as returned for timestamp columns
fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    let epoch = raw.split_whitespace().next()?;
    let (secs, frac) = epoch.split_once('.').unwrap_or((epoch, ""));
    let mut secs: i64 = secs.parse().ok()?;

    let digits: String = frac.chars().take(9).collect();
    let mut nanos: u32 = if digits.is_empty() {
        0
    } else {
        format!("{digits:0<9}").parse().ok()?
    };

    if epoch.starts_with('-') && nanos > 0 {
        secs -= 1;
        nanos = 1_000_000_000 - nanos;
    }

    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn columns(names: &[(&str, &str)]) -> Vec<ColumnType> {
        names
            .iter()
            .map(|(n, t)| ColumnType {
                name: n.to_string(),
                column_type: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_parse_epoch_with_offset() {
        let ts = parse_epoch("1704067200.250000000 1440").unwrap();
        assert_eq!(ts.timestamp(), 1_704_067_200);
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_epoch_plain_and_invalid() {
        assert_eq!(
            parse_epoch("1704067200").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!(parse_epoch("yesterday").is_none());
        assert!(parse_epoch("").is_none());
    }

    #[test]
    fn test_parse_negative_epoch_fraction() {
        let ts = parse_epoch("-1.500000000").unwrap();
        assert_eq!(ts.timestamp_millis(), -1500);
    }

    #[test]
    fn test_row_reader_decodes_types() {
        let reader = RowReader::new(&columns(&[
            ("SKU", "text"),
            ("PRICE", "fixed"),
            ("WH_1_AVAILABLE_QTY", "fixed"),
            ("PRESENT_IN_XB_FLAG", "boolean"),
            ("LATEST_PO_CREATED_DATE", "date"),
            ("UPDATED_AT_SNOWFLAKE", "timestamp_tz"),
        ]));

        let row = vec![
            Some("SKU-1".to_string()),
            Some("19.99".to_string()),
            Some("12.00".to_string()),
            Some("true".to_string()),
            Some("19723".to_string()),
            None,
        ];

        let record = reader.decode(&row).unwrap();
        assert_eq!(record.sku.as_deref(), Some("SKU-1"));
        assert_eq!(record.price, Some(19.99));
        assert_eq!(record.wh1_available_qty, Some(12));
        assert_eq!(record.present_in_xb_flag, Some(true));
        assert_eq!(
            record.latest_po_created_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(record.updated_at_snowflake.is_none());
        assert!(record.brand.is_none());
    }

    #[test]
    fn test_row_reader_rejects_bad_number() {
        let reader = RowReader::new(&columns(&[("PRICE", "fixed")]));
        let err = reader.decode(&[Some("n/a".to_string())]).unwrap_err();
        assert!(err.to_string().contains("PRICE"));
    }
}
