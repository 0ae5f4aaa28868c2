//! # Ingestion
//!
//! Inbound event surface.
//!
//! Responsibilities:
//! - Filter inbound events against the configured allow-list
//! - Hand eligible events (with their serialized sizes) to the buffer
//! - Provide event sources for the CLI: NDJSON files and a mock generator

mod error;
mod filter;
mod metrics;
mod relay;
mod source;

pub use error::{IngestionError, Result};
pub use filter::EventFilter;
pub use metrics::{IngestionMetrics, IngestionSnapshot};
pub use relay::Relay;
pub use source::{JsonlEventSource, MockEventSource, MockSourceConfig};
