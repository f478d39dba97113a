//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for SkuSync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// SkuSync - Item master sync pipeline
#[derive(Parser, Debug)]
#[command(name = "skusync")]
#[command(version, about, long_about = None)]
#[command(author = "SkuSync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "skusync.toml", env = "SKUSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SKUSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process SKUs, or the configured time window when none are given
    Process(commands::process::ProcessArgs),

    /// Run an EventBridge or API Gateway event read from a file
    Invoke(commands::invoke::InvokeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
