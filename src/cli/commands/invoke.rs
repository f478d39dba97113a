//! Invoke command implementation
//!
//! Runs a saved EventBridge or API Gateway event through the same handler
//! the Lambda binary uses and prints the response envelope.

use crate::config::load_config;
use crate::core::pipeline::SkuPipeline;
use crate::invocation::handle_event;
use clap::Args;
use serde_json::Value;
use std::fs;

/// Arguments for the invoke command
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Path to a JSON event file
    #[arg(short, long)]
    pub event: String,
}

impl InvokeArgs {
    /// Execute the invoke command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(event = %self.event, "Invoking handler with event file");

        let event = match read_event(&self.event) {
            Ok(v) => v,
            Err(message) => {
                tracing::error!(error = %message, "Failed to read event file");
                eprintln!("{message}");
                return Ok(2);
            }
        };

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let pipeline = match SkuPipeline::from_config(&config).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4);
            }
        };

        let response = handle_event(&pipeline, &event).await;
        println!("{}", serde_json::to_string_pretty(&response)?);

        Ok(if response.is_success() { 0 } else { 1 })
    }
}

fn read_event(path: &str) -> Result<Value, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read event file {path}: {e}"))?;
    serde_json::from_str(&contents).map_err(|e| format!("Event file {path} is not valid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_event() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"source": "custom.skuprocessor"}}"#).unwrap();

        let event = read_event(file.path().to_str().unwrap()).unwrap();
        assert_eq!(event["source"], "custom.skuprocessor");
    }

    #[test]
    fn test_read_event_rejects_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_event(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_missing_event_file() {
        let args = InvokeArgs {
            event: "/nonexistent/event.json".to_string(),
        };
        assert_eq!(args.execute("skusync.toml").await.unwrap(), 2);
    }
}
