//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::HttpMethod;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    allowed_event_types: usize,
    request_url: String,
    method: String,
    max_bytes: usize,
    max_interval_secs: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    allowed_event_types: config.filter.event_types().len(),
                    request_url: config.sink.request_url.clone(),
                    method: config.sink.method.to_string(),
                    max_bytes: config.buffer.max_bytes,
                    max_interval_secs: config.buffer.max_interval_secs,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // GET with a JSON body is unusual but forwarded as configured
    if config.sink.method == HttpMethod::Get {
        warnings.push("sink.method is GET - the item payload is still sent as a body".to_string());
    }

    // A tiny size threshold degenerates into one flush per event
    if config.buffer.max_bytes < 1024 {
        warnings.push(format!(
            "buffer.max_bytes is very small ({}) - most adds will trigger a flush",
            config.buffer.max_bytes
        ));
    }

    if config.buffer.max_interval_secs > 60 {
        warnings.push(format!(
            "buffer.max_interval_secs is large ({}) - buffered events may sit for a long time",
            config.buffer.max_interval_secs
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("OK Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Allowed event types: {}", summary.allowed_event_types);
            println!("  Endpoint: {} {}", summary.method, summary.request_url);
            println!("  Buffer: {} bytes / {}s", summary.max_bytes, summary.max_interval_secs);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("FAIL Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
