// SkuSync - Item master sync pipeline
// Copyright (c) 2025 SkuSync Contributors
// Licensed under the MIT License

//! # SkuSync - Item master sync pipeline
//!
//! SkuSync pulls product records from a Snowflake catalog, validates and
//! maps them to the canonical item-master message, keeps an audit row per
//! record in PostgreSQL, and publishes valid records to an SQS FIFO queue.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`invocation`] - EventBridge / API Gateway event parsing and response envelope
//! - [`core`] - Business logic (transform, orchestrate, publish, reconcile)
//! - [`adapters`] - External integrations (Snowflake, PostgreSQL, SQS)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skusync::config::load_config;
//! use skusync::core::pipeline::SkuPipeline;
//! use skusync::domain::Sku;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("skusync.toml")?;
//! let pipeline = SkuPipeline::from_config(&config).await?;
//!
//! let result = pipeline.process_request(&Sku::parse_list("100234,100235")).await?;
//! println!("Published {} of {} SKUs", result.publish_success_count, result.total_requested);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Infrastructure and request failures surface as [`domain::SkuSyncError`].
//! Per-record validation and publish failures never do; they are reported
//! in the run result's detail rows.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod invocation;
pub mod logging;
