//! EventSink trait - outbound dispatch interface
//!
//! Defines the abstract interface for sinks. A sink receives one event per
//! call; batching is the buffer's concern, not the sink's.

use crate::{Event, RelayError};

/// Event output trait
///
/// All sink implementations must implement this trait. `send` takes `&self`
/// so a single sink instance can serve both the ingestion path and the
/// background interval flusher.
#[trait_variant::make(EventSink: Send)]
pub trait LocalEventSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Dispatch one event to the destination
    ///
    /// # Errors
    /// Returns a transport-level error; HTTP error statuses are not errors
    /// at this interface.
    async fn send(&self, event: &Event) -> Result<(), RelayError>;
}
