//! RelayConfig - Config Loader output
//!
//! Describes the complete relay configuration: event allow-list, sink
//! endpoint, buffer thresholds, observability overrides.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelayConfig {
    /// Event allow-list settings
    pub filter: FilterConfig,

    /// Destination endpoint settings
    #[validate(nested)]
    pub sink: SinkEndpoint,

    /// Buffer thresholds
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Observability overrides
    #[serde(default)]
    pub observability: ObservabilityOverrides,
}

/// Event allow-list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Comma-separated event type names to forward (e.g., "purchase,signup")
    pub events_to_include: String,
}

impl FilterConfig {
    /// Split the allow-list into trimmed, de-duplicated type names
    ///
    /// Preserves first-seen order; empty entries are dropped.
    pub fn event_types(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.events_to_include
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_string()))
            .map(str::to_string)
            .collect()
    }
}

/// Destination endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkEndpoint {
    /// Item ingestion URL (e.g., "http://gorse.internal:8087/api/item/")
    #[validate(url(message = "request_url must be a valid URL"))]
    pub request_url: String,

    /// HTTP method for the outbound request
    pub method: HttpMethod,
}

/// HTTP method for outbound requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Uppercase wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffer flush thresholds
///
/// Either condition being met triggers a flush: accumulated serialized bytes
/// reaching `max_bytes`, or `max_interval_secs` elapsing with at least one
/// buffered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Size threshold in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Interval threshold in seconds, must be > 0
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            max_interval_secs: default_max_interval_secs(),
        }
    }
}

impl BufferConfig {
    /// Interval threshold as a Duration
    pub fn max_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.max_interval_secs)
    }
}

fn default_max_bytes() -> usize {
    1024 * 1024 // 1 MiB
}

fn default_max_interval_secs() -> u64 {
    1
}

/// Optional observability settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityOverrides {
    /// Prometheus exporter port (None = disabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}
