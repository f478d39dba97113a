//! Trigger disambiguation
//!
//! An invocation arrives either from the scheduler (an EventBridge event
//! whose `source` is [`SCHEDULED_SOURCE`]) or from API Gateway (an event
//! whose `body` is a JSON string `{"skus": [...]}`). Property names are
//! matched case-insensitively in both.

use crate::domain::{Result, Sku, SkuSyncError};
use serde_json::Value;

/// `source` value of scheduled events
pub const SCHEDULED_SOURCE: &str = "custom.skuprocessor";

/// What started an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Scheduled poll of the recent update window
    Scheduled,
    /// Explicit SKU list from an API request
    Api(Vec<Sku>),
}

impl Trigger {
    /// Classify a raw invocation event
    ///
    /// # Errors
    ///
    /// Returns `SkuSyncError::InvalidRequest` if the event is neither a
    /// scheduled event nor an API request with a parseable body.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use skusync::invocation::Trigger;
    ///
    /// let trigger = Trigger::from_event(&json!({"source": "custom.skuprocessor"})).unwrap();
    /// assert_eq!(trigger, Trigger::Scheduled);
    ///
    /// let trigger = Trigger::from_event(&json!({"body": "{\"skus\": [\"A\", \" \"]}"})).unwrap();
    /// assert_eq!(trigger.skus().len(), 1);
    /// ```
    pub fn from_event(event: &Value) -> Result<Self> {
        let is_scheduled = property(event, "source")
            .and_then(Value::as_str)
            .is_some_and(|source| source.eq_ignore_ascii_case(SCHEDULED_SOURCE));

        if is_scheduled {
            tracing::info!("Scheduled trigger detected");
            return Ok(Trigger::Scheduled);
        }

        let body = property(event, "body")
            .and_then(Value::as_str)
            .filter(|body| !body.is_empty());

        if let Some(body) = body {
            tracing::info!("API trigger detected");
            return parse_body(body).map(Trigger::Api);
        }

        Err(SkuSyncError::InvalidRequest(
            "Unknown event format - request must be from EventBridge or API Gateway".to_string(),
        ))
    }

    /// Requested SKUs; empty for scheduled triggers
    pub fn skus(&self) -> &[Sku] {
        match self {
            Trigger::Scheduled => &[],
            Trigger::Api(skus) => skus,
        }
    }
}

fn property<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value
        .as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

fn parse_body(body: &str) -> Result<Vec<Sku>> {
    let invalid = |reason: String| SkuSyncError::InvalidRequest(format!("Invalid JSON in request body: {reason}"));

    let parsed: Value = serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;
    if !parsed.is_object() {
        return Err(invalid("expected an object".to_string()));
    }

    let skus = match property(&parsed, "skus") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid("skus must be an array of strings".to_string())),
    };

    let mut result = Vec::with_capacity(skus.len());
    for item in skus {
        match item {
            Value::String(s) => {
                if let Ok(sku) = Sku::new(s.trim()) {
                    result.push(sku);
                }
            }
            Value::Null => {}
            _ => return Err(invalid("skus must be an array of strings".to_string())),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scheduled_source_is_case_insensitive() {
        let event = json!({"Source": "CUSTOM.SkuProcessor", "detail": {}});
        assert_eq!(Trigger::from_event(&event).unwrap(), Trigger::Scheduled);
    }

    #[test]
    fn test_scheduled_wins_over_body() {
        let event = json!({"source": "custom.skuprocessor", "body": "{\"skus\":[\"A\"]}"});
        assert_eq!(Trigger::from_event(&event).unwrap(), Trigger::Scheduled);
    }

    #[test]
    fn test_api_body_drops_blank_skus() {
        let event = json!({"Body": "{\"Skus\": [\"A-1\", \"\", \"  \", \" B-2 \", null]}"});
        let trigger = Trigger::from_event(&event).unwrap();
        let skus: Vec<&str> = trigger.skus().iter().map(Sku::as_str).collect();
        assert_eq!(skus, vec!["A-1", "B-2"]);
    }

    #[test]
    fn test_api_body_without_skus_is_window_poll() {
        let trigger = Trigger::from_event(&json!({"body": "{}"})).unwrap();
        assert_eq!(trigger, Trigger::Api(Vec::new()));
        assert!(trigger.skus().is_empty());
    }

    #[test]
    fn test_malformed_body() {
        let err = Trigger::from_event(&json!({"body": "{not json"})).unwrap_err();
        match err {
            SkuSyncError::InvalidRequest(msg) => assert!(msg.starts_with("Invalid JSON in request body: ")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_sku_type() {
        let err = Trigger::from_event(&json!({"body": "{\"skus\": [1, 2]}"})).unwrap_err();
        assert!(matches!(err, SkuSyncError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_event() {
        for event in [json!({}), json!({"body": ""}), json!({"source": "aws.events"}), json!([1, 2])] {
            let err = Trigger::from_event(&event).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Invalid request: Unknown event format - request must be from EventBridge or API Gateway"
            );
        }
    }
}
