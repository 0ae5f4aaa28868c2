//! Relay - the inbound entry point
//!
//! Explicit context object constructed once at setup and handed to every
//! operation; there is no module-level state. Setup failure means this
//! object is never built, so no event can reach a half-initialized relay.

use std::sync::Arc;

use batch_engine::EventBuffer;
use contracts::{Event, EventSink, RelayError};
use tracing::{debug, instrument};

use crate::filter::EventFilter;
use crate::metrics::IngestionMetrics;

/// Inbound event relay
///
/// Ties the allow-list filter to the buffer. `on_event` is the per-event
/// entry point invoked by the host delivery mechanism.
pub struct Relay<S> {
    filter: EventFilter,
    buffer: Arc<EventBuffer<S>>,
    metrics: Arc<IngestionMetrics>,
}

impl<S> Relay<S>
where
    S: EventSink + Send + Sync,
{
    /// Create a relay over an already-configured buffer
    pub fn new(filter: EventFilter, buffer: Arc<EventBuffer<S>>) -> Self {
        Self {
            filter,
            buffer,
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Handle one inbound event
    ///
    /// Ineligible events are dropped silently (counted, not errors). For an
    /// eligible event the serialized size is computed once here, then
    /// ownership moves into the buffer; the call only returns after any
    /// size-triggered flush it caused has completed.
    ///
    /// # Errors
    /// `RelayError::BufferClosed` when the buffer has been torn down.
    #[instrument(name = "relay_on_event", skip(self, event), fields(event_type = %event.event))]
    pub async fn on_event(&self, event: Event) -> Result<(), RelayError> {
        self.metrics.record_received();
        observability::record_event_received(&event.event);

        if !self.filter.is_eligible(&event) {
            self.metrics.record_filtered();
            observability::record_event_dropped(&event.event);
            debug!("event type not in allow-list, dropped");
            return Ok(());
        }

        let size = event.serialized_size();
        self.buffer.add(event, size).await
    }

    /// Force a final flush and close the buffer
    ///
    /// Awaits completion; events arriving afterwards fail loudly.
    pub async fn teardown(&self) {
        self.buffer.shutdown().await;
    }

    /// Ingestion counters
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &Arc<EventBuffer<S>> {
        &self.buffer
    }
}
