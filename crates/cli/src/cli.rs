//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// harvestd - host metrics collection daemon
#[derive(Parser, Debug)]
#[command(
    name = "harvestd",
    author,
    version,
    about = "Host metrics collection daemon",
    long_about = "A plugin-driven metrics collection daemon.\n\n\
                  Loads plugin configuration, polls registered metric sources on a \n\
                  fixed interval, validates samples against their schemas, and fans \n\
                  them out to every registered sink."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HARVESTD_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HARVESTD_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collection daemon
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "harvestd.toml", env = "HARVESTD_CONFIG")]
    pub config: PathBuf,

    /// Override the reported hostname from configuration
    #[arg(long, env = "HARVESTD_HOSTNAME")]
    pub hostname: Option<String>,

    /// Override the global collection interval in seconds
    #[arg(long, env = "HARVESTD_INTERVAL")]
    pub interval: Option<u64>,

    /// Validate configuration and exit without running the daemon
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled, overrides configuration)
    #[arg(long, env = "HARVESTD_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "harvestd.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "harvestd.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show each plugin's configured options
    #[arg(long)]
    pub plugins: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
