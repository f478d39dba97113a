//! Batch pipeline
//!
//! - [`orchestrator`] partitions a record set and drives each chunk
//! - [`publisher`] sends records to the queue with bounded concurrency and retry
//! - [`aggregator`] reconciles publish outcomes with the audit log
//! - [`report`] holds the per-run result returned to callers

pub mod aggregator;
pub mod orchestrator;
pub mod publisher;
pub mod report;

pub use aggregator::{build_report, reconcile};
pub use orchestrator::{chunk_count, PipelineSettings, SkuPipeline, TransformFn};
pub use publisher::{retry_with_backoff, ConcurrentPublisher, RetryPolicy};
pub use report::{RecordDetail, RunCounters, RunResult, NO_DATA_FOUND};
