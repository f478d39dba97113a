//! Integration tests for logging functionality
//!
//! A global subscriber can only be installed once per process, so only one
//! test here calls `init_logging`.

use skusync::config::LoggingConfig;
use skusync::logging::{init_logging, parse_log_level};
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "/var/log/skusync");
}

#[test]
fn test_console_only_disables_file_layer() {
    let config = LoggingConfig::console_only();
    assert!(!config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_init_logging_creates_log_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
        local_max_size_mb: 100,
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).expect("Failed to initialize logging");
    assert!(guard.has_file_writer());
    assert!(log_path.is_dir());

    // Second install fails: the global subscriber is already set
    assert!(init_logging("info", &LoggingConfig::console_only()).is_err());
}

#[test]
fn test_invalid_level_is_rejected_before_install() {
    let err = parse_log_level("verbose").unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_logging_macros_usage() {
    use skusync::core::pipeline::RunResult;
    use std::time::Duration;

    let result = RunResult::no_data().with_duration(Duration::from_millis(12));

    skusync::log_chunk_processing!(1, 3, 100);
    skusync::log_retry_attempt!("SKU-1", 1, 4, Duration::from_millis(1000), "throttled");
    skusync::log_run_complete!(&result);

    assert_eq!(result.duration, Duration::from_millis(12));
}
