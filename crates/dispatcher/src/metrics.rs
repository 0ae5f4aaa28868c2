//! Dispatch counters for external aggregation

use std::sync::atomic::{AtomicU64, Ordering};

/// Relay dispatch counters
///
/// Two monotonic counters for the process lifetime; no reset operation.
/// `total_requests` counts every dispatch attempt, `errors` only those whose
/// transport call failed.
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Total outbound requests attempted
    total_requests: AtomicU64,
    /// Total transport-level failures
    errors: AtomicU64,
}

impl RelayMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Increment total request count
    pub fn inc_total_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Get error count
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Increment error count
    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests(),
            errors: self.errors(),
        }
    }
}

/// Snapshot of dispatch counters (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_are_monotonic() {
        let metrics = RelayMetrics::new();
        assert_eq!(metrics.total_requests(), 0);
        assert_eq!(metrics.errors(), 0);

        metrics.inc_total_requests();
        metrics.inc_total_requests();
        metrics.inc_errors();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.errors, 1);
    }
}
