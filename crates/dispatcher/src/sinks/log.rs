//! LogSink - logs the would-be payload via tracing
//!
//! Used by `run --log-only` and by tests; counts requests like the real sink
//! so end-of-run statistics stay meaningful.

use std::sync::Arc;

use contracts::{Event, EventSink, RelayError};
use tracing::{info, instrument};

use crate::metrics::RelayMetrics;
use crate::payload::ItemPayload;

/// Sink that logs item payloads instead of sending them
pub struct LogSink {
    name: String,
    metrics: Arc<RelayMetrics>,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }

    /// Shared dispatch counters
    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }
}

impl EventSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_send",
        skip(self, event),
        fields(sink = %self.name, event_type = %event.event)
    )]
    async fn send(&self, event: &Event) -> Result<(), RelayError> {
        let payload = ItemPayload::from_event(event);
        self.metrics.inc_total_requests();

        info!(
            item_id = %payload.item_id,
            categories = ?payload.categories,
            labels = ?payload.labels,
            comment = %payload.comment,
            timestamp = %payload.timestamp,
            "Item payload (log only)"
        );

        observability::record_item_dispatched(&self.name, "success");
        Ok(())
    }
}
