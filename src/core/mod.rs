//! Core business logic for SkuSync.
//!
//! # Modules
//!
//! - [`transform`] - Validation and canonical mapping of raw records
//! - [`pipeline`] - Chunking, publishing, reconciliation and reporting
//!
//! # Run Workflow
//!
//! 1. **Fetch**: Load raw records by SKU, or poll the recent update window
//! 2. **Transform**: Validate each record and build its canonical form
//! 3. **Persist**: Append one audit entry per record and commit, per chunk
//! 4. **Publish**: Send valid records to the queue with retry
//! 5. **Reconcile**: Flag sent entries and record publish errors
//! 6. **Report**: Return counters and one detail row per record
//!
//! # Example
//!
//! ```rust,no_run
//! use skusync::config::load_config;
//! use skusync::core::pipeline::SkuPipeline;
//! use skusync::domain::Sku;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("skusync.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let pipeline = SkuPipeline::from_config(&config).await?.with_shutdown(shutdown_rx);
//!
//! let result = pipeline.process_request(&Sku::parse_list("SKU-1,SKU-2")).await?;
//!
//! println!("Valid: {}", result.valid_count);
//! println!("Sent: {}", result.publish_success_count);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod transform;
