//! Configuration validation
//!
//! Validation rules:
//! - events_to_include yields at least one type name after split/dedup
//! - request_url is a well-formed URL
//! - buffer thresholds are positive

use contracts::{RelayConfig, RelayError};
use validator::Validate;

/// Validate a RelayConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &RelayConfig) -> Result<(), RelayError> {
    validate_filter(config)?;
    validate_sink(config)?;
    validate_buffer(config)?;
    Ok(())
}

/// The allow-list must name at least one event type
fn validate_filter(config: &RelayConfig) -> Result<(), RelayError> {
    if config.filter.event_types().is_empty() {
        return Err(RelayError::config_validation(
            "filter.events_to_include",
            "no events to include",
        ));
    }
    Ok(())
}

/// The sink endpoint must carry a well-formed URL
fn validate_sink(config: &RelayConfig) -> Result<(), RelayError> {
    if config.sink.request_url.is_empty() {
        return Err(RelayError::config_validation(
            "sink.request_url",
            "request_url cannot be empty",
        ));
    }

    // Derive-level checks (URL shape)
    config.validate().map_err(|e| {
        RelayError::config_validation("sink.request_url", e.to_string().replace('\n', "; "))
    })?;

    Ok(())
}

/// Thresholds must be positive so a flush can eventually trigger
fn validate_buffer(config: &RelayConfig) -> Result<(), RelayError> {
    if config.buffer.max_bytes == 0 {
        return Err(RelayError::config_validation(
            "buffer.max_bytes",
            "max_bytes must be > 0",
        ));
    }
    if config.buffer.max_interval_secs == 0 {
        return Err(RelayError::config_validation(
            "buffer.max_interval_secs",
            "max_interval_secs must be > 0",
        ));
    }
    Ok(())
}
