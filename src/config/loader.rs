//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::SkuSyncConfig;
use super::secret::secret_string;
use crate::domain::errors::SkuSyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into SkuSyncConfig
/// 4. Applies environment variable overrides (SKUSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use skusync::config::loader::load_config;
///
/// let config = load_config("skusync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<SkuSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(SkuSyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        SkuSyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: SkuSyncConfig = toml::from_str(&contents)
        .map_err(|e| SkuSyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        SkuSyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| SkuSyncError::Other(format!("Invalid placeholder pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(SkuSyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Applies environment variable overrides using the SKUSYNC_* prefix
///
/// Variables follow the pattern SKUSYNC_<SECTION>_<KEY>, for example
/// SKUSYNC_QUEUE_QUEUE_URL or SKUSYNC_PERFORMANCE_BATCH_SIZE. Unparseable
/// numeric values are ignored.
fn apply_env_overrides(config: &mut SkuSyncConfig) {
    if let Ok(val) = std::env::var("SKUSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Catalog
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_ACCOUNT_URL") {
        config.catalog.account_url = val;
    }
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_TOKEN") {
        config.catalog.token = secret_string(val);
    }
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_TOKEN_TYPE") {
        config.catalog.token_type = val;
    }
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_WAREHOUSE") {
        config.catalog.warehouse = val;
    }
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_ROLE") {
        config.catalog.role = Some(val);
    }
    if let Ok(val) = std::env::var("SKUSYNC_CATALOG_TABLE") {
        config.catalog.table = val;
    }

    // PostgreSQL
    if let Ok(val) = std::env::var("SKUSYNC_POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_string(val);
    }
    if let Some(max) = env_parse("SKUSYNC_POSTGRESQL_MAX_CONNECTIONS") {
        config.postgresql.max_connections = max;
    }
    if let Ok(val) = std::env::var("SKUSYNC_POSTGRESQL_SSL_MODE") {
        config.postgresql.ssl_mode = val;
    }

    // Queue
    if let Ok(val) = std::env::var("SKUSYNC_QUEUE_QUEUE_URL") {
        config.queue.queue_url = val;
    }
    if let Ok(val) = std::env::var("SKUSYNC_QUEUE_REGION") {
        config.queue.region = val;
    }
    if let Ok(val) = std::env::var("SKUSYNC_QUEUE_ENDPOINT_URL") {
        config.queue.endpoint_url = Some(val);
    }
    if let Some(retries) = env_parse("SKUSYNC_QUEUE_MAX_RETRIES") {
        config.queue.max_retries = retries;
    }

    // Performance
    if let Some(degree) = env_parse("SKUSYNC_PERFORMANCE_PARALLEL_DEGREE") {
        config.performance.parallel_degree = degree;
    }
    if let Some(size) = env_parse("SKUSYNC_PERFORMANCE_BATCH_SIZE") {
        config.performance.batch_size = size;
    }
    if let Some(delay) = env_parse("SKUSYNC_PERFORMANCE_BATCH_DELAY_MS") {
        config.performance.batch_delay_ms = delay;
    }

    // Scheduler
    if let Some(hours) = env_parse("SKUSYNC_SCHEDULER_LOOKBACK_HOURS") {
        config.scheduler.lookback_hours = hours;
    }
    if let Some(limit) = env_parse("SKUSYNC_SCHEDULER_LIMIT") {
        config.scheduler.limit = limit;
    }

    // Logging
    if let Some(enabled) = env_parse("SKUSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = enabled;
    }
    if let Ok(val) = std::env::var("SKUSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
