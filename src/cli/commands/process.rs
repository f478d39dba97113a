//! Process command implementation
//!
//! This module implements the `process` command, which runs one request
//! through the pipeline from a terminal.

use crate::config::load_config;
use crate::core::pipeline::{RunResult, SkuPipeline};
use crate::domain::Sku;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// SKU(s) to process (comma-separated). Omit to poll the configured time window
    #[arg(long)]
    pub sku: Option<String>,

    /// Print the run report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting process command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let skus = self.sku.as_deref().map(Sku::parse_list).unwrap_or_default();
        if self.sku.is_some() && skus.is_empty() {
            eprintln!("--sku was given but contains no SKUs");
            return Ok(2);
        }

        if skus.is_empty() {
            tracing::info!(
                lookback_hours = config.scheduler.lookback_hours,
                limit = config.scheduler.limit,
                "No SKUs given, polling time window"
            );
        } else {
            tracing::info!(skus = ?skus, "Processing SKUs from CLI");
        }

        let pipeline = match SkuPipeline::from_config(&config).await {
            Ok(p) => p.with_shutdown(shutdown_signal),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create pipeline");
                eprintln!("Failed to initialize pipeline: {e}");
                return Ok(4);
            }
        };

        if !self.json {
            println!("🚀 Starting run...");
            println!();
        }

        let result = match pipeline.process_request(&skus).await {
            Ok(r) => r,
            Err(e) if e.is_connection_error() => {
                tracing::error!(error = %e, "Run failed to reach a backing store");
                eprintln!("Run failed: {e}");
                return Ok(4);
            }
            Err(e) => {
                tracing::error!(error = %e, "Run failed");
                eprintln!("Run failed: {e}");
                return Ok(5);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            print_summary(&result);
        }

        Ok(exit_code(&result))
    }
}

fn print_summary(result: &RunResult) {
    println!("📊 Run Summary:");
    println!("  Total SKUs: {}", result.total_requested);
    println!("  Valid: {}", result.valid_count);
    println!("  Invalid: {}", result.invalid_count);
    println!("  Published: {}", result.publish_success_count);
    println!("  Publish Failed: {}", result.publish_failure_count);
    println!("  Audit Entries Saved: {}", result.logs_saved_count);
    println!("  Duration: {:.2}s", result.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", result.success_rate());
    println!();

    let errors: Vec<_> = result.details.iter().filter(|d| !d.error.is_empty()).collect();
    if !errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for (i, detail) in errors.iter().enumerate() {
            if i < 10 {
                let sku = if detail.sku.is_empty() { "-" } else { detail.sku.as_str() };
                println!("  - {sku}: {}", detail.error);
            }
        }
        if errors.len() > 10 {
            println!("  ... and {} more errors", errors.len() - 10);
        }
        println!();
    }

    if result.interrupted {
        println!("⚠️  Run interrupted. Completed chunks are committed.");
    } else if result.is_successful() {
        println!("✅ Run completed successfully!");
    } else {
        println!("⚠️  Run completed with failures");
    }
}

/// Exit code for a finished run
fn exit_code(result: &RunResult) -> i32 {
    if result.interrupted {
        130
    } else if result.is_successful() {
        0
    } else {
        1
    }
}
