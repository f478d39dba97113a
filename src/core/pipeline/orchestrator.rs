//! Batch orchestrator
//!
//! Drives one request end to end: fetch raw records, transform them with
//! bounded parallelism, then for each chunk persist the audit entries,
//! publish the valid records and reconcile the outcomes.
//!
//! Record sets at or below `batch_size` run as a single pass. Larger sets are
//! split into consecutive chunks of `batch_size`, with `batch_delay` between
//! chunks. Chunk `n + 1` starts only after chunk `n` is committed and
//! reconciled. Committed chunks are never rolled back.

use crate::adapters::catalog::CatalogSource;
use crate::adapters::database::AuditStore;
use crate::adapters::queue::MessageQueue;
use crate::adapters::{create_audit_store, create_catalog, create_message_queue};
use crate::config::SkuSyncConfig;
use crate::core::pipeline::aggregator::{build_report, reconcile};
use crate::core::pipeline::publisher::{ConcurrentPublisher, RetryPolicy};
use crate::core::pipeline::report::{RecordDetail, RunCounters, RunResult};
use crate::core::transform::transform_record;
use crate::domain::{AuditEntry, ProcessedItem, RawRecord, Result, Sku, SkuSyncError};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Tuning knobs for one pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Maximum records in flight per stage
    pub parallel_degree: usize,
    /// Single-pass threshold and chunk size
    pub batch_size: usize,
    /// Pause between chunks
    pub batch_delay: Duration,
    /// Window length for requests without SKUs
    pub lookback_hours: u32,
    /// Row limit for window requests
    pub window_limit: u32,
}

impl PipelineSettings {
    pub fn from_config(config: &SkuSyncConfig) -> Self {
        Self {
            parallel_degree: config.performance.parallel_degree,
            batch_size: config.performance.batch_size,
            batch_delay: config.performance.batch_delay(),
            lookback_hours: config.scheduler.lookback_hours,
            window_limit: config.scheduler.limit,
        }
    }
}

/// Number of chunks `count` records split into
pub fn chunk_count(count: usize, batch_size: usize) -> usize {
    if count == 0 {
        0
    } else {
        count.div_ceil(batch_size.max(1))
    }
}

/// Per-record transformation, run on the blocking pool
pub type TransformFn = fn(RawRecord) -> Result<ProcessedItem>;

/// The record-processing pipeline
pub struct SkuPipeline {
    catalog: Arc<dyn CatalogSource>,
    audit: Arc<dyn AuditStore>,
    publisher: ConcurrentPublisher,
    settings: PipelineSettings,
    transform: TransformFn,
    shutdown: Option<watch::Receiver<bool>>,
}

impl SkuPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        audit: Arc<dyn AuditStore>,
        queue: Arc<dyn MessageQueue>,
        settings: PipelineSettings,
        retry: RetryPolicy,
    ) -> Self {
        let publisher = ConcurrentPublisher::new(queue, retry, settings.parallel_degree);
        Self {
            catalog,
            audit,
            publisher,
            settings,
            transform: transform_record,
            shutdown: None,
        }
    }

    /// Build the pipeline and its collaborators from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any collaborator cannot be created.
    pub async fn from_config(config: &SkuSyncConfig) -> Result<Self> {
        let catalog = create_catalog(config)?;
        let audit = create_audit_store(config).await?;
        let queue = create_message_queue(config).await?;

        Ok(Self::new(
            catalog,
            audit,
            queue,
            PipelineSettings::from_config(config),
            RetryPolicy::from_config(&config.queue),
        ))
    }

    /// Stop between chunks once `shutdown` turns true
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Replace the record transformation
    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = transform;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn audit_store(&self) -> &Arc<dyn AuditStore> {
        &self.audit
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }

    /// Process a request
    ///
    /// An empty `ids` slice polls the configured time window instead. A
    /// request that matches nothing returns the "no data found" report.
    ///
    /// # Errors
    ///
    /// Catalog and audit store failures are returned. Per-record validation
    /// and publish failures are reported in the result instead.
    pub async fn process_request(&self, ids: &[Sku]) -> Result<RunResult> {
        let start = Instant::now();

        let raw = if ids.is_empty() {
            let to = Utc::now();
            let from = to
                .checked_sub_signed(chrono::Duration::hours(i64::from(self.settings.lookback_hours)))
                .ok_or_else(|| {
                    SkuSyncError::Configuration(format!(
                        "scheduler.lookback_hours {} reaches past the earliest representable time",
                        self.settings.lookback_hours
                    ))
                })?;
            tracing::info!(%from, %to, limit = self.settings.window_limit, "Polling catalog window");
            self.catalog
                .fetch_by_window(from, to, self.settings.window_limit)
                .await?
        } else {
            tracing::info!(requested = ids.len(), "Fetching requested SKUs");
            self.catalog.fetch_by_ids(ids).await?
        };

        if raw.is_empty() {
            tracing::info!(source = self.catalog.source_name(), "No records found");
            return Ok(RunResult::no_data().with_duration(start.elapsed()));
        }

        let mut result = self.run(raw).await?;
        result.duration = start.elapsed();
        result.log_summary();
        Ok(result)
    }

    /// Transform, persist, publish and reconcile a record set
    pub async fn run(&self, raw: Vec<RawRecord>) -> Result<RunResult> {
        let items = self.transform_all(raw).await;
        self.publish_all(items).await
    }

    /// Validate and map every record, at most `parallel_degree` at a time
    ///
    /// A record whose transformation fails or panics becomes an invalid item
    /// carrying a `Processing error:` message; the rest carry on. A shutdown
    /// request stops the stage after the current chunk.
    pub async fn transform_all(&self, raw: Vec<RawRecord>) -> Vec<ProcessedItem> {
        let total = raw.len();
        let batch_size = self.settings.batch_size.max(1);

        if total <= batch_size {
            return self.transform_pass(raw).await;
        }

        let chunks = chunk_count(total, batch_size);
        let mut items = Vec::with_capacity(total);
        let mut records = raw.into_iter();

        for chunk in 1..=chunks {
            let batch: Vec<RawRecord> = records.by_ref().take(batch_size).collect();
            tracing::debug!(chunk, total_chunks = chunks, size = batch.len(), "Transforming chunk");
            items.extend(self.transform_pass(batch).await);

            if chunk < chunks {
                if self.shutdown_requested() {
                    tracing::warn!(
                        completed_chunks = chunk,
                        total_chunks = chunks,
                        "Shutdown requested, skipping remaining transform chunks"
                    );
                    break;
                }
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        items
    }

    async fn transform_pass(&self, raw: Vec<RawRecord>) -> Vec<ProcessedItem> {
        let transform = self.transform;
        stream::iter(raw)
            .map(|record| async move {
                let sku = record.sku_label();
                match tokio::task::spawn_blocking(move || transform(record)).await {
                    Ok(Ok(item)) => item,
                    Ok(Err(e)) => {
                        tracing::warn!(sku = %sku, error = %e, "Record transformation failed");
                        ProcessedItem::failed(sku, &e.to_string())
                    }
                    Err(e) => {
                        let message = panic_message(e);
                        tracing::error!(sku = %sku, error = %message, "Record transformation panicked");
                        ProcessedItem::failed(sku, &message)
                    }
                }
            })
            .buffered(self.settings.parallel_degree.max(1))
            .collect()
            .await
    }

    /// Persist, publish and reconcile processed items chunk by chunk
    pub async fn publish_all(&self, items: Vec<ProcessedItem>) -> Result<RunResult> {
        let total = items.len();
        let batch_size = self.settings.batch_size.max(1);
        let chunks = chunk_count(total, batch_size);

        let mut counters = RunCounters::default();
        let mut details: Vec<RecordDetail> = Vec::with_capacity(total);
        let mut interrupted = false;
        let mut remaining = items.into_iter();

        for chunk in 1..=chunks {
            if self.shutdown_requested() {
                tracing::warn!(
                    completed_chunks = chunk - 1,
                    total_chunks = chunks,
                    "Shutdown requested, skipping remaining chunks"
                );
                interrupted = true;
                break;
            }

            let batch: Vec<ProcessedItem> = remaining.by_ref().take(batch_size).collect();
            crate::log_chunk_processing!(chunk, chunks, batch.len());

            let (chunk_counters, chunk_details) = self.process_chunk(batch).await?;
            counters.add(chunk_counters);
            details.extend(chunk_details);

            if chunk < chunks {
                tokio::time::sleep(self.settings.batch_delay).await;
            }
        }

        let mut result = RunResult::from_counters(counters, details);
        result.interrupted = interrupted;
        Ok(result)
    }

    async fn process_chunk(
        &self,
        mut items: Vec<ProcessedItem>,
    ) -> Result<(RunCounters, Vec<RecordDetail>)> {
        let entries: Vec<AuditEntry> = items.iter().map(|item| item.entry.clone()).collect();
        let ids = self.audit.append_all(&entries).await?;
        for (item, id) in items.iter_mut().zip(&ids) {
            item.entry.id = Some(*id);
        }
        self.audit.commit().await?;

        let outcomes = self.publisher.publish_all(&items).await;
        reconcile(self.audit.as_ref(), &outcomes).await?;

        let valid = items.iter().filter(|item| item.is_valid).count();
        let publish_success = outcomes.iter().filter(|o| o.success).count();
        let counters = RunCounters {
            valid,
            invalid: items.len() - valid,
            publish_success,
            publish_failure: outcomes.len() - publish_success,
            logs_saved: ids.len(),
        };

        tracing::debug!(
            valid = counters.valid,
            invalid = counters.invalid,
            sent = counters.publish_success,
            failed = counters.publish_failure,
            "Chunk complete"
        );

        Ok((counters, build_report(&items, &outcomes)))
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "transformation panicked".to_string())
}
