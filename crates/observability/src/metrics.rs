//! Relay metrics collection
//!
//! Records per-event and per-flush metrics through the `metrics` facade and
//! aggregates flush statistics in memory for the end-of-run summary.

use metrics::{counter, gauge, histogram};

/// Record an inbound event hitting the relay
pub fn record_event_received(event_type: &str) {
    counter!(
        "gorse_relay_events_received_total",
        "event_type" => event_type.to_string()
    )
    .increment(1);
}

/// Record an inbound event rejected by the allow-list filter
pub fn record_event_dropped(event_type: &str) {
    counter!(
        "gorse_relay_events_filtered_total",
        "event_type" => event_type.to_string()
    )
    .increment(1);
}

/// Record the buffer's accumulated byte total after an add
pub fn record_buffer_bytes(bytes: usize) {
    gauge!("gorse_relay_buffer_bytes").set(bytes as f64);
}

/// Record a completed flush
///
/// `trigger` is one of "size", "interval", "shutdown".
pub fn record_flush(trigger: &str, items: usize, bytes: usize, duration_ms: f64) {
    counter!(
        "gorse_relay_flushes_total",
        "trigger" => trigger.to_string()
    )
    .increment(1);

    histogram!("gorse_relay_flush_duration_ms").record(duration_ms);
    histogram!("gorse_relay_flush_batch_size").record(items as f64);
    histogram!("gorse_relay_flush_batch_bytes").record(bytes as f64);
}

/// Record a single item dispatch outcome
///
/// `status` is "success" for a 2xx exchange, "http_error" for a completed
/// exchange with a non-success status, and "transport_error" when the call
/// itself failed.
pub fn record_item_dispatched(sink_name: &str, status: &str) {
    counter!(
        "gorse_relay_items_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Flush statistics aggregator
///
/// Aggregates per-flush outcomes in memory for the end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct FlushStatsAggregator {
    /// Total non-empty flushes
    pub total_flushes: u64,

    /// Total items drained across all flushes
    pub total_items: u64,

    /// Total items whose dispatch failed at the transport level
    pub total_send_errors: u64,

    /// Flush duration statistics (ms)
    pub duration_ms: RunningStats,

    /// Batch size statistics (items)
    pub batch_size: RunningStats,

    /// Batch size statistics (bytes)
    pub batch_bytes: RunningStats,
}

impl FlushStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed flush
    pub fn update(&mut self, items: usize, bytes: usize, send_errors: usize, duration_ms: f64) {
        self.total_flushes += 1;
        self.total_items += items as u64;
        self.total_send_errors += send_errors as u64;
        self.duration_ms.push(duration_ms);
        self.batch_size.push(items as f64);
        self.batch_bytes.push(bytes as f64);
    }

    /// Generate a summary report
    pub fn summary(&self) -> FlushSummary {
        FlushSummary {
            total_flushes: self.total_flushes,
            total_items: self.total_items,
            total_send_errors: self.total_send_errors,
            duration_ms: StatsSummary::from(&self.duration_ms),
            batch_size: StatsSummary::from(&self.batch_size),
            batch_bytes: StatsSummary::from(&self.batch_bytes),
        }
    }
}

/// Flush summary
#[derive(Debug, Clone, Default)]
pub struct FlushSummary {
    pub total_flushes: u64,
    pub total_items: u64,
    pub total_send_errors: u64,
    pub duration_ms: StatsSummary,
    pub batch_size: StatsSummary,
    pub batch_bytes: StatsSummary,
}

impl std::fmt::Display for FlushSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flush Summary ===")?;
        writeln!(f, "Total flushes: {}", self.total_flushes)?;
        writeln!(f, "Items dispatched: {}", self.total_items)?;
        writeln!(f, "Send errors: {}", self.total_send_errors)?;
        writeln!(f, "Flush duration (ms): {}", self.duration_ms)?;
        writeln!(f, "Batch size (items): {}", self.batch_size)?;
        writeln!(f, "Batch size (bytes): {}", self.batch_bytes)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
