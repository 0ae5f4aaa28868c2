//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Gorse Relay - buffered event forwarding into a Gorse item ingestion API
#[derive(Parser, Debug)]
#[command(
    name = "gorse-relay",
    author,
    version,
    about = "Buffered event relay for Gorse item ingestion",
    long_about = "Filters application events against a configured allow-list, \n\
                  buffers them by size and time thresholds, and forwards each \n\
                  buffered event to a Gorse-style HTTP ingestion endpoint."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GORSE_RELAY_VERBOSE")]
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
        env = "GORSE_RELAY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay pipeline
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
    #[arg(short, long, default_value = "config.toml", env = "GORSE_RELAY_CONFIG")]
    pub config: PathBuf,

    /// NDJSON event file to replay (one event per line)
    #[arg(short, long, env = "GORSE_RELAY_INPUT", conflicts_with = "mock")]
    pub input: Option<PathBuf>,

    /// Generate synthetic events instead of reading a file
    #[arg(long)]
    pub mock: bool,

    /// Synthetic event rate in events per second (mock mode only)
    #[arg(long, default_value = "10.0", env = "GORSE_RELAY_MOCK_RATE")]
    pub mock_rate: f64,

    /// Override the sink request URL from configuration
    #[arg(long, env = "GORSE_RELAY_URL")]
    pub url: Option<String>,

    /// Maximum number of inbound events to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "GORSE_RELAY_MAX_EVENTS")]
    pub max_events: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "GORSE_RELAY_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running the pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Log outbound item payloads instead of sending HTTP requests
    #[arg(long)]
    pub log_only: bool,

    /// Channel buffer size for the internal event queue
    #[arg(long, default_value = "100", env = "GORSE_RELAY_CHANNEL_CAPACITY")]
    pub channel_capacity: usize,

    /// Metrics server port (0 = disabled, overrides configuration)
    #[arg(long, default_value = "0", env = "GORSE_RELAY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the full allow-list
    #[arg(long)]
    pub events: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
