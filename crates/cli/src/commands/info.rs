//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Resolved configuration view for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    config_path: String,
    allowed_event_types: Vec<String>,
    request_url: String,
    method: String,
    max_bytes: usize,
    max_interval_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics_port: Option<u16>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let view = ConfigInfo {
        config_path: args.config.display().to_string(),
        allowed_event_types: config.filter.event_types(),
        request_url: config.sink.request_url.clone(),
        method: config.sink.method.to_string(),
        max_bytes: config.buffer.max_bytes,
        max_interval_secs: config.buffer.max_interval_secs,
        metrics_port: config.observability.metrics_port,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&view).context("Failed to serialize config info")?;
        println!("{}", json);
        return Ok(());
    }

    println!("\n=== Gorse Relay Configuration ===\n");
    println!("Config: {}", view.config_path);

    println!("\nFilter ({} types):", view.allowed_event_types.len());
    if args.events {
        for name in &view.allowed_event_types {
            println!("  - {}", name);
        }
    } else {
        println!("  {}", view.allowed_event_types.join(", "));
    }

    println!("\nSink:");
    println!("  {} {}", view.method, view.request_url);

    println!("\nBuffer thresholds:");
    println!("  max_bytes: {}", view.max_bytes);
    println!("  max_interval_secs: {}", view.max_interval_secs);

    if let Some(port) = view.metrics_port {
        println!("\nMetrics port: {}", port);
    }

    println!();
    Ok(())
}
