//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output, always on
//! - Optional JSON log files with rotation
//! - `RUST_LOG` takes precedence over the configured level
//!
//! # Example
//!
//! ```no_run
//! use skusync::logging::init_logging;
//! use skusync::config::LoggingConfig;
//!
//! let _guard = init_logging("info", &LoggingConfig::console_only()).expect("Failed to initialize logging");
//!
//! tracing::info!(sku = "SKU-1", "Record validated");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of one chunk of a run
///
/// # Example
///
/// ```no_run
/// use skusync::log_chunk_processing;
///
/// log_chunk_processing!(3, 6, 100);
/// ```
#[macro_export]
macro_rules! log_chunk_processing {
    ($chunk:expr, $total_chunks:expr, $size:expr) => {
        tracing::info!(
            chunk = $chunk,
            total_chunks = $total_chunks,
            size = $size,
            "Processing chunk"
        );
    };
}

/// Log a publish retry for one record
///
/// # Example
///
/// ```no_run
/// use skusync::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!("SKU-1", 2, 4, Duration::from_millis(2000), "throttled");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($sku:expr, $attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            sku = %$sku,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying publish"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use skusync::log_error_with_context;
/// use skusync::domain::SkuSyncError;
///
/// let error = SkuSyncError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log the counters of a finished run
///
/// # Example
///
/// ```no_run
/// use skusync::log_run_complete;
/// use skusync::core::pipeline::RunResult;
///
/// let result = RunResult::default();
/// log_run_complete!(&result);
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($result:expr) => {
        tracing::info!(
            total = $result.total_requested,
            valid = $result.valid_count,
            invalid = $result.invalid_count,
            sent = $result.publish_success_count,
            failed = $result.publish_failure_count,
            logs_saved = $result.logs_saved_count,
            duration_ms = $result.duration.as_millis() as u64,
            "Run completed"
        );
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    #[test]
    fn test_macros_expand() {
        log_chunk_processing!(1, 2, 100);
        log_retry_attempt!("SKU-1", 1, 4, Duration::from_millis(1000), "throttled");
        log_error_with_context!("boom", "test");
    }
}
