//! Layered error definitions
//!
//! Categorized by source: config / buffer / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum RelayError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Buffer Errors =====
    /// Buffer has been shut down and no longer accepts events
    #[error("event buffer is closed, cannot accept event '{event_type}'")]
    BufferClosed { event_type: String },

    // ===== Sink Errors =====
    /// Sink request error (the outbound call could not complete)
    #[error("sink '{sink_name}' request error: {message}")]
    SinkRequest { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl RelayError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create buffer closed error
    pub fn buffer_closed(event_type: impl Into<String>) -> Self {
        Self::BufferClosed {
            event_type: event_type.into(),
        }
    }

    /// Create sink request error
    pub fn sink_request(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkRequest {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
