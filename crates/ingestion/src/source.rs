//! Event sources for the CLI
//!
//! `JsonlEventSource` replays newline-delimited JSON events from a file;
//! `MockEventSource` generates synthetic commerce events at a fixed rate for
//! testing without a host delivery mechanism.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_channel::{bounded, Receiver};
use chrono::Utc;
use contracts::Event;
use serde_json::json;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::error::IngestionError;
use crate::metrics::IngestionMetrics;

/// NDJSON file event source
///
/// One event per line; unparseable lines are counted and skipped, never
/// fatal.
pub struct JsonlEventSource {
    path: PathBuf,
}

impl JsonlEventSource {
    /// Create a source for the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the file and start streaming events
    ///
    /// Returns the receiving end of the event channel; the channel closes
    /// when the file is exhausted.
    ///
    /// # Errors
    /// IO error when the file cannot be opened.
    pub async fn start(
        &self,
        channel_capacity: usize,
        metrics: Option<Arc<IngestionMetrics>>,
    ) -> crate::Result<Receiver<Event>> {
        let file = File::open(&self.path).await?;
        let (tx, rx) = bounded(channel_capacity);
        let path = self.path.clone();
        let metrics = metrics.unwrap_or_else(|| Arc::new(IngestionMetrics::new()));

        tokio::spawn(async move {
            let mut lines = BufReader::new(file).lines();
            let mut line_no: usize = 0;

            while let Ok(Some(line)) = lines.next_line().await {
                line_no += 1;
                if line.trim().is_empty() {
                    continue;
                }

                match parse_line(&line, line_no) {
                    Ok(event) => {
                        if tx.send(event).await.is_err() {
                            debug!(path = %path.display(), "event channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        metrics.record_parse_error();
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping unparseable event line"
                        );
                    }
                }
            }

            debug!(path = %path.display(), lines = line_no, "jsonl source finished");
        });

        Ok(rx)
    }
}

/// Parse one NDJSON line into an event
fn parse_line(line: &str, line_no: usize) -> crate::Result<Event> {
    serde_json::from_str(line).map_err(|e| IngestionError::ParseFailed {
        line: line_no,
        message: e.to_string(),
    })
}

/// Mock event source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Generation rate (Hz)
    pub frequency_hz: f64,

    /// Event type names to cycle through
    pub event_types: Vec<String>,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 10.0,
            event_types: vec!["purchase".into(), "view".into(), "cart_add".into()],
        }
    }
}

/// Mock event source
///
/// Generates synthetic commerce events for testing.
pub struct MockEventSource {
    config: MockSourceConfig,
    running: Arc<AtomicBool>,
}

/// Synthetic catalog the mock source cycles through
const CATALOG: [(&str, &str, &str, &str, &str); 3] = [
    ("shirt", "sku-100", "19.99", "Blue Shirt", "apparel"),
    ("book", "sku-200", "42.00", "Systems Primer", "media"),
    ("mug", "sku-300", "9.50", "Stone Mug", "kitchen"),
];

impl MockEventSource {
    /// Create a new mock source
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock source at the given rate with default event types
    pub fn with_rate(frequency_hz: f64) -> Self {
        Self::new(MockSourceConfig {
            frequency_hz,
            ..Default::default()
        })
    }

    /// Start the mock source, returning the event stream
    pub fn start(&self, channel_capacity: usize) -> Receiver<Event> {
        let (tx, rx) = bounded(channel_capacity);
        let config = self.config.clone();
        let running = self.running.clone();

        running.store(true, Ordering::SeqCst);

        tokio::spawn(async move {
            let interval = Duration::from_secs_f64(1.0 / config.frequency_hz);
            let mut seq: u64 = 0;

            debug!(
                frequency_hz = config.frequency_hz,
                event_types = ?config.event_types,
                "mock event source started"
            );

            while running.load(Ordering::Relaxed) {
                let event = Self::synthesize(&config, seq);
                seq += 1;

                if tx.send(event).await.is_err() {
                    debug!("mock event channel closed");
                    break;
                }

                tokio::time::sleep(interval).await;
            }

            debug!(events = seq, "mock event source stopped");
        });

        rx
    }

    /// Stop the mock source
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn synthesize(config: &MockSourceConfig, seq: u64) -> Event {
        let event_type = &config.event_types[(seq as usize) % config.event_types.len()];
        let (item_type, sku, price, name, category) = CATALOG[(seq as usize) % CATALOG.len()];

        let mut event = Event::new(event_type.clone());
        event.timestamp = Some(Utc::now());
        for (key, value) in [
            ("item_type", json!(item_type)),
            ("item_id", json!(format!("{sku}-{seq}"))),
            ("item_price", json!(price)),
            ("item_name", json!(name)),
            ("item_category", json!(category)),
        ] {
            event.properties.insert(key.to_string(), value);
        }
        event
    }
}
