//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::FlushSummary;

/// Statistics from a relay run
#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    /// Total inbound events received
    pub events_received: u64,

    /// Events rejected by the allow-list filter
    pub events_filtered: u64,

    /// Input lines that failed to parse
    pub parse_errors: u64,

    /// Total outbound requests attempted
    pub total_requests: u64,

    /// Requests whose transport call failed
    pub request_errors: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Aggregated flush statistics
    pub flush_summary: FlushSummary,
}

impl RelayStats {
    /// Events that passed the filter
    pub fn events_forwarded(&self) -> u64 {
        self.events_received.saturating_sub(self.events_filtered)
    }

    /// Inbound events per second
    pub fn eps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events_received as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Transport error rate as a percentage of attempts
    pub fn error_rate(&self) -> f64 {
        if self.total_requests > 0 {
            (self.request_errors as f64 / self.total_requests as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Relay Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Events received: {}", self.events_received);
        println!("Events filtered: {}", self.events_filtered);
        println!("Events forwarded: {}", self.events_forwarded());
        if self.parse_errors > 0 {
            println!("Parse errors: {}", self.parse_errors);
        }
        println!("Events/sec: {:.2}", self.eps());
        println!();
        println!("Requests attempted: {}", self.total_requests);
        println!(
            "Request errors: {} ({:.2}%)",
            self.request_errors,
            self.error_rate()
        );
        println!();
        print!("{}", self.flush_summary);
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let stats = RelayStats {
            events_received: 100,
            events_filtered: 40,
            total_requests: 60,
            request_errors: 3,
            duration: Duration::from_secs(10),
            ..Default::default()
        };

        assert_eq!(stats.events_forwarded(), 60);
        assert!((stats.eps() - 10.0).abs() < 1e-10);
        assert!((stats.error_rate() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_duration_eps() {
        let stats = RelayStats::default();
        assert_eq!(stats.eps(), 0.0);
        assert_eq!(stats.error_rate(), 0.0);
    }
}
