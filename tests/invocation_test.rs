//! Invocation handling against in-memory collaborators

mod common;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::*;
use serde_json::{json, Value};
use skusync::adapters::CatalogSource;
use skusync::core::pipeline::SkuPipeline;
use skusync::domain::{CatalogError, RawRecord, Result, Sku};
use skusync::invocation::{handle_event, InvocationResponse};
use std::sync::Arc;

fn body(response: &InvocationResponse) -> Value {
    serde_json::from_str(&response.body).unwrap()
}

fn memory_pipeline(records: Vec<RawRecord>) -> (SkuPipeline, Arc<RecordingQueue>) {
    let queue = Arc::new(RecordingQueue::new());
    let pipeline = pipeline(records, Arc::new(MemoryAuditStore::new()), queue.clone(), 10);
    (pipeline, queue)
}

#[tokio::test]
async fn test_api_request_processes_listed_skus() {
    let (pipeline, queue) = memory_pipeline(mixed_records(5, 0));
    let event = json!({
        "httpMethod": "POST",
        "body": "{\"skus\": [\"SKU-0001\", \"SKU-0004\", \"\"]}"
    });

    let response = handle_event(&pipeline, &event).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.headers["Content-Type"], "application/json");
    let body = body(&response);
    assert_eq!(body["result"]["TotalSKUs"], 2);
    assert_eq!(body["result"]["SqsSuccess"], 2);
    assert_eq!(body["result"]["Details"].as_array().unwrap().len(), 2);
    assert_eq!(queue.delivered().len(), 2);
}

#[tokio::test]
async fn test_scheduled_event_polls_window() {
    let (pipeline, queue) = memory_pipeline(mixed_records(3, 3));
    let event = json!({
        "source": "custom.skuprocessor",
        "detail-type": "Scheduled Event",
        "detail": {}
    });

    let response = handle_event(&pipeline, &event).await;

    assert_eq!(response.status_code, 200);
    let body = body(&response);
    assert_eq!(body["result"]["TotalSKUs"], 3);
    assert_eq!(body["result"]["ValidSKUs"], 2);
    assert_eq!(body["result"]["InvalidSKUs"], 1);
    assert_eq!(body["result"]["LogSaved"], 3);
    assert_eq!(queue.delivered().len(), 2);
}

#[tokio::test]
async fn test_scheduled_event_with_nothing_updated() {
    let (pipeline, _) = memory_pipeline(Vec::new());

    let response = handle_event(&pipeline, &json!({"source": "custom.skuprocessor"})).await;

    assert_eq!(response.status_code, 200);
    let body = body(&response);
    assert_eq!(body["result"]["TotalSKUs"], 0);
    assert_eq!(body["result"]["Details"][0]["Error"], "No data found in Snowflake");
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let (pipeline, queue) = memory_pipeline(mixed_records(2, 0));

    let response = handle_event(&pipeline, &json!({"body": "{\"skus\": [\"A\""})).await;

    assert_eq!(response.status_code, 400);
    let body = body(&response);
    assert_eq!(body["error"], "Invalid request format");
    assert!(body["result"]["Details"][0]["Error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON in request body: "));
    assert!(queue.delivered().is_empty());
}

#[tokio::test]
async fn test_unknown_event_is_client_error() {
    let (pipeline, _) = memory_pipeline(Vec::new());

    let response = handle_event(&pipeline, &json!({"detail": {}})).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(
        body(&response)["result"]["Details"][0]["Error"],
        "Unknown event format - request must be from EventBridge or API Gateway"
    );
}

struct UnreachableCatalog;

#[async_trait]
impl CatalogSource for UnreachableCatalog {
    async fn fetch_by_ids(&self, _ids: &[Sku]) -> Result<Vec<RawRecord>> {
        Err(CatalogError::ConnectionFailed("HTTP 401".to_string()).into())
    }

    async fn fetch_by_window(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _limit: u32,
    ) -> Result<Vec<RawRecord>> {
        Err(CatalogError::QueryFailed("warehouse suspended".to_string()).into())
    }

    fn source_name(&self) -> &str {
        "unreachable"
    }
}

fn unreachable_pipeline() -> SkuPipeline {
    SkuPipeline::new(
        Arc::new(UnreachableCatalog),
        Arc::new(MemoryAuditStore::new()),
        Arc::new(RecordingQueue::new()),
        settings(2, 10),
        fast_retry(1),
    )
}

#[tokio::test]
async fn test_connection_failure_is_database_error() {
    let response = handle_event(
        &unreachable_pipeline(),
        &json!({"body": "{\"skus\": [\"A\"]}"}),
    )
    .await;

    assert_eq!(response.status_code, 500);
    let body = body(&response);
    assert_eq!(body["error"], "Database connection error");
    assert_eq!(body["result"]["TotalSKUs"], 0);
}

#[tokio::test]
async fn test_other_failure_is_internal_error() {
    let response = handle_event(&unreachable_pipeline(), &json!({"source": "custom.skuprocessor"})).await;

    assert_eq!(response.status_code, 500);
    let body = body(&response);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["result"]["Details"][0]["Error"]
        .as_str()
        .unwrap()
        .contains("warehouse suspended"));
}
