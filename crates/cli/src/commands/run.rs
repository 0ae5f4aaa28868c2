//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{EventInput, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut relay_config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref url) = args.url {
        info!(url = %url, "Overriding sink URL from CLI");
        relay_config.sink.request_url = url.clone();
    }

    info!(
        events_to_include = %relay_config.filter.events_to_include,
        url = %relay_config.sink.request_url,
        method = %relay_config.sink.method,
        max_bytes = relay_config.buffer.max_bytes,
        max_interval_secs = relay_config.buffer.max_interval_secs,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&relay_config);
        return Ok(());
    }

    // Pick the inbound event mode
    let input = if args.mock {
        EventInput::Mock {
            rate: args.mock_rate,
        }
    } else if let Some(ref path) = args.input {
        EventInput::Jsonl(path.clone())
    } else {
        anyhow::bail!("No event source: pass --input <file> or --mock");
    };

    // Metrics port: CLI flag wins over configuration
    let metrics_port = if args.metrics_port != 0 {
        Some(args.metrics_port)
    } else {
        relay_config.observability.metrics_port
    };

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        relay_config,
        input,
        max_events: if args.max_events == 0 {
            None
        } else {
            Some(args.max_events)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        channel_capacity: args.channel_capacity,
        metrics_port,
        log_only: args.log_only,
    };

    // Create and run pipeline with graceful shutdown
    let pipeline = Pipeline::new(pipeline_config);

    info!("Starting pipeline...");

    let stats = pipeline
        .run(setup_shutdown_signal())
        .await
        .context("Pipeline execution failed")?;

    info!(
        events_received = stats.events_received,
        events_filtered = stats.events_filtered,
        requests = stats.total_requests,
        errors = stats.request_errors,
        duration_secs = stats.duration.as_secs_f64(),
        "Pipeline completed successfully"
    );

    // Print detailed statistics
    stats.print_summary();

    info!("Gorse Relay finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &contracts::RelayConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Filter:");
    let types = config.filter.event_types();
    println!("  Allowed event types ({}):", types.len());
    for name in &types {
        println!("    - {}", name);
    }

    println!("\nSink:");
    println!("  URL: {}", config.sink.request_url);
    println!("  Method: {}", config.sink.method);

    println!("\nBuffer:");
    println!("  Max bytes: {}", config.buffer.max_bytes);
    println!("  Max interval: {}s", config.buffer.max_interval_secs);

    if let Some(port) = config.observability.metrics_port {
        println!("\nObservability:");
        println!("  Metrics port: {}", port);
    }

    println!();
}
