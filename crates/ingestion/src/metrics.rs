//! Ingestion metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion-side counters
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total events received from the host
    pub events_received: AtomicU64,

    /// Events rejected by the allow-list filter
    pub events_filtered: AtomicU64,

    /// Input lines that failed to parse
    pub parse_errors: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record event received
    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record event rejected by the filter
    pub fn record_filtered(&self) {
        self.events_filtered.fetch_add(1, Ordering::Relaxed);
    }

    /// Record parse error
    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> IngestionSnapshot {
        IngestionSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_filtered: self.events_filtered.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionSnapshot {
    /// Total events received from the host
    pub events_received: u64,

    /// Events rejected by the allow-list filter
    pub events_filtered: u64,

    /// Input lines that failed to parse
    pub parse_errors: u64,
}

impl IngestionSnapshot {
    /// Events that passed the filter
    pub fn events_eligible(&self) -> u64 {
        self.events_received.saturating_sub(self.events_filtered)
    }
}
