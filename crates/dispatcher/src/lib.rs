//! # Dispatcher
//!
//! Outbound dispatch module.
//!
//! Responsible for:
//! - Building the destination item payload from event properties
//! - Issuing one HTTP request per buffered event
//! - Counting `total_requests` / `errors` for external scraping

pub mod metrics;
pub mod payload;
pub mod sinks;

pub use contracts::{Event, EventSink};
pub use metrics::{MetricsSnapshot, RelayMetrics};
pub use payload::ItemPayload;
pub use sinks::{HttpSink, LogSink};
