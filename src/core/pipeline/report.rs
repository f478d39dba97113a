//! Run report
//!
//! [`RunResult`] is what a caller gets back from one invocation: aggregate
//! counters plus one detail row per processed record. Field names on the
//! wire follow the downstream contract (`TotalSKUs`, `SqsSuccess`, ...).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error text reported when a request matches no catalog rows
pub const NO_DATA_FOUND: &str = "No data found in Snowflake";

/// Outcome of one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDetail {
    #[serde(rename = "Sku")]
    pub sku: String,

    #[serde(rename = "IsValid")]
    pub is_valid: bool,

    #[serde(rename = "SentToSQS")]
    pub was_sent: bool,

    #[serde(rename = "Error")]
    pub error: String,
}

impl RecordDetail {
    /// Row carrying only an error, used for whole-request failures
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            ..Default::default()
        }
    }
}

/// Counters accumulated over one chunk or one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub valid: usize,
    pub invalid: usize,
    pub publish_success: usize,
    pub publish_failure: usize,
    pub logs_saved: usize,
}

impl RunCounters {
    pub fn add(&mut self, other: RunCounters) {
        self.valid += other.valid;
        self.invalid += other.invalid;
        self.publish_success += other.publish_success;
        self.publish_failure += other.publish_failure;
        self.logs_saved += other.logs_saved;
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }
}

/// Report of one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "TotalSKUs")]
    pub total_requested: usize,

    #[serde(rename = "ValidSKUs")]
    pub valid_count: usize,

    #[serde(rename = "InvalidSKUs")]
    pub invalid_count: usize,

    #[serde(rename = "SqsSuccess")]
    pub publish_success_count: usize,

    #[serde(rename = "SqsFailed")]
    pub publish_failure_count: usize,

    #[serde(rename = "LogSaved")]
    pub logs_saved_count: usize,

    #[serde(rename = "Details")]
    pub details: Vec<RecordDetail>,

    /// Wall-clock time of the run
    #[serde(skip)]
    pub duration: Duration,

    /// Set when a shutdown signal stopped the run between chunks
    #[serde(skip)]
    pub interrupted: bool,
}

impl RunResult {
    /// Build a report from accumulated counters and detail rows
    pub fn from_counters(counters: RunCounters, details: Vec<RecordDetail>) -> Self {
        Self {
            total_requested: counters.total(),
            valid_count: counters.valid,
            invalid_count: counters.invalid,
            publish_success_count: counters.publish_success,
            publish_failure_count: counters.publish_failure,
            logs_saved_count: counters.logs_saved,
            details,
            duration: Duration::ZERO,
            interrupted: false,
        }
    }

    /// Report with zero counters and a single error row
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            details: vec![RecordDetail::error(message)],
            ..Default::default()
        }
    }

    /// Report for a request that matched no catalog rows
    pub fn no_data() -> Self {
        Self::error(NO_DATA_FOUND)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn counters(&self) -> RunCounters {
        RunCounters {
            valid: self.valid_count,
            invalid: self.invalid_count,
            publish_success: self.publish_success_count,
            publish_failure: self.publish_failure_count,
            logs_saved: self.logs_saved_count,
        }
    }

    /// Every record was valid and published, and the run was not cut short
    pub fn is_successful(&self) -> bool {
        self.invalid_count == 0 && self.publish_failure_count == 0 && !self.interrupted
    }

    /// Share of valid records that reached the queue, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.valid_count == 0 {
            return 100.0;
        }
        (self.publish_success_count as f64 / self.valid_count as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        crate::log_run_complete!(self);
        tracing::info!(
            success_rate = format!("{:.2}%", self.success_rate()),
            interrupted = self.interrupted,
            "Run summary"
        );

        let failed: Vec<&RecordDetail> = self
            .details
            .iter()
            .filter(|d| !d.error.is_empty())
            .collect();
        if !failed.is_empty() {
            tracing::warn!(count = failed.len(), "Run completed with record errors");
            for detail in failed {
                tracing::debug!(sku = %detail.sku, valid = detail.is_valid, error = %detail.error, "Record error");
            }
        }
    }
}
