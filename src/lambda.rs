// SkuSync - Item master sync pipeline
// Copyright (c) 2025 SkuSync Contributors
// Licensed under the MIT License

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use skusync::config::{load_config, LoggingConfig};
use skusync::core::pipeline::SkuPipeline;
use skusync::invocation::{handle_event, InvocationResponse};
use skusync::logging::init_logging;
use std::sync::Arc;

async fn function_handler(
    pipeline: Arc<SkuPipeline>,
    event: LambdaEvent<Value>,
) -> Result<InvocationResponse, Error> {
    tracing::info!(request_id = %event.context.request_id, "Handling invocation");
    Ok(handle_event(&pipeline, &event.payload).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let log_level = std::env::var("SKUSYNC_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    // CloudWatch captures stdout; no file layer.
    let _guard = init_logging(&log_level, &LoggingConfig::console_only())?;

    let config_path =
        std::env::var("SKUSYNC_CONFIG").unwrap_or_else(|_| "skusync.toml".to_string());
    let config = load_config(&config_path)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        "SkuSync Lambda starting"
    );

    // Built once per execution environment and reused across invocations.
    let pipeline = Arc::new(SkuPipeline::from_config(&config).await?);

    run(service_fn(move |event: LambdaEvent<Value>| {
        function_handler(Arc::clone(&pipeline), event)
    }))
    .await
}
