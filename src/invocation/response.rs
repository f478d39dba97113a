//! Response envelope
//!
//! Every invocation yields an [`InvocationResponse`], including failed ones:
//! the status code says what went wrong and the body still carries a report.

use crate::core::pipeline::{RunResult, SkuPipeline};
use crate::domain::SkuSyncError;
use crate::invocation::event::Trigger;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// API Gateway proxy response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON document, serialized
    pub body: String,
}

impl InvocationResponse {
    fn new(status_code: u16, body: Value) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// 200 with `{"result": ...}`
    pub fn success(result: &RunResult) -> Self {
        Self::new(200, json!({ "result": result }))
    }

    /// Error status with `{"error": ..., "result": <error report>}`
    pub fn failure(status_code: u16, error: &str, details: impl Into<String>) -> Self {
        Self::new(
            status_code,
            json!({ "error": error, "result": RunResult::error(details) }),
        )
    }

    /// Map a failed invocation to its response
    pub fn from_error(error: &SkuSyncError) -> Self {
        match error {
            SkuSyncError::InvalidRequest(message) => {
                Self::failure(400, "Invalid request format", message.as_str())
            }
            e if e.is_connection_error() => {
                Self::failure(500, "Database connection error", e.to_string())
            }
            e => Self::failure(500, "Internal server error", e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Run one invocation event through the pipeline
///
/// Never fails: request and infrastructure errors become error responses.
pub async fn handle_event(pipeline: &SkuPipeline, event: &Value) -> InvocationResponse {
    let outcome = match Trigger::from_event(event) {
        Ok(trigger) => pipeline.process_request(trigger.skus()).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            tracing::info!(total = result.total_requested, "Invocation completed");
            InvocationResponse::success(&result)
        }
        Err(e) => {
            crate::log_error_with_context!(&e, "Invocation failed");
            InvocationResponse::from_error(&e)
        }
    }
}
