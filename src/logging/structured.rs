//! Subscriber installation
//!
//! Console output is always enabled. When `logging.local_enabled` is set a
//! second layer writes JSON lines to rolling files through a non-blocking
//! writer.

use crate::config::LoggingConfig;
use crate::domain::{Result, SkuSyncError};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// File name prefix of rolled log files
pub const LOG_FILE_PREFIX: &str = "skusync.log";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Flushes buffered file output when dropped; hold it until exit
pub struct LoggingGuard {
    file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Whether a file writer is attached
    pub fn has_file_writer(&self) -> bool {
        self.file_guard.is_some()
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over `level` when set. Without it only `skusync` events
/// at `level` and above are emitted.
///
/// # Errors
///
/// Fails on an unknown level, an uncreatable log directory, or when a
/// global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use skusync::logging::init_logging;
/// use skusync::config::LoggingConfig;
///
/// let _guard = init_logging("info", &LoggingConfig::console_only()).expect("logging");
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skusync={level}")));

    let mut layers: Vec<BoxedLayer> = vec![tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter.clone())
        .boxed()];

    let file_guard = if config.local_enabled {
        let (layer, guard) = json_file_layer(config, filter)?;
        layers.push(layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| SkuSyncError::Configuration(format!("Failed to install subscriber: {e}")))?;

    tracing::info!(
        %level,
        file_logging = config.local_enabled,
        log_dir = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard::new(file_guard))
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn json_file_layer(config: &LoggingConfig, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard)> {
    let dir = Path::new(&config.local_path);
    std::fs::create_dir_all(dir).map_err(|e| {
        SkuSyncError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;

    let appender = RollingFileAppender::new(rotation(&config.local_rotation), dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();

    Ok((layer, guard))
}

// tracing-appender has no size-based policy; "size" rolls daily.
fn rotation(policy: &str) -> Rotation {
    match policy {
        "hourly" => Rotation::HOURLY,
        _ => Rotation::DAILY,
    }
}

/// Parse a level name, ignoring case
pub fn parse_log_level(name: &str) -> Result<Level> {
    let lowered = name.to_ascii_lowercase();
    if !LEVELS.contains(&lowered.as_str()) {
        return Err(SkuSyncError::Configuration(format!(
            "Invalid log level: {name}. Must be one of: {}",
            LEVELS.join(", ")
        )));
    }
    lowered
        .parse::<Level>()
        .map_err(|e| SkuSyncError::Configuration(format!("Invalid log level {name}: {e}")))
}
