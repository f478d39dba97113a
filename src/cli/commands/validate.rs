//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the SkuSync configuration file.

use crate::adapters::postgresql::client::redact;
use crate::config::{load_config, masked};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Secrets are never printed in full.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Snowflake Account: {}", config.catalog.account_url);
        println!("  Snowflake Token: {}", masked(&config.catalog.token));
        println!(
            "  Snowflake Source: {}.{}.{}",
            config.catalog.database, config.catalog.schema, config.catalog.table
        );
        println!("  Warehouse: {}", config.catalog.warehouse);
        println!(
            "  PostgreSQL Connection: {}",
            redact(config.postgresql.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.postgresql.max_connections);
        println!("  SSL Mode: {}", config.postgresql.ssl_mode);
        println!("  Queue URL: {}", config.queue.queue_url);
        println!("  Queue Region: {}", config.queue.region);
        if let Some(endpoint) = &config.queue.endpoint_url {
            println!("  Queue Endpoint: {endpoint}");
        }
        println!("  Max Retries: {}", config.queue.max_retries);
        println!("  Parallel Degree: {}", config.performance.parallel_degree);
        println!("  Batch Size: {}", config.performance.batch_size);
        println!("  Batch Delay: {}ms", config.performance.batch_delay_ms);
        println!("  Lookback: {}h", config.scheduler.lookback_hours);
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let args = ValidateArgs {};
        assert_eq!(args.execute("/nonexistent/skusync.toml").await.unwrap(), 2);
    }
}
