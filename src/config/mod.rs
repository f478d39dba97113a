//! Configuration management for SkuSync.
//!
//! A single [`SkuSyncConfig`] is loaded once at start-up from a TOML file and
//! passed into every constructor. Nothing below the CLI or Lambda entry
//! point reads the environment directly.
//!
//! Loading supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `SKUSYNC_<SECTION>_<KEY>` overrides
//! - Default values for optional settings
//! - Per-section validation
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [catalog]
//! account_url = "https://acme-prod.snowflakecomputing.com"
//! token = "${SKUSYNC_SNOWFLAKE_TOKEN}"
//! database = "RETAIL"
//! schema = "PUBLIC"
//! warehouse = "COMPUTE_WH"
//!
//! [postgresql]
//! connection_string = "${SKUSYNC_DATABASE_URL}"
//!
//! [queue]
//! queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/item-master.fifo"
//! region = "us-east-1"
//!
//! [performance]
//! parallel_degree = 100
//! batch_size = 100
//! ```
//!
//! ```rust,no_run
//! use skusync::config::load_config;
//!
//! # fn example() {
//! match load_config("skusync.toml") {
//!     Ok(config) => println!("Batch size: {}", config.performance.batch_size),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CatalogConfig, Environment, LoggingConfig, PerformanceConfig,
    PostgreSQLConfig, QueueConfig, SchedulerConfig, SkuSyncConfig,
};
pub use secret::{masked, secret_string, SecretString, SecretValue};
