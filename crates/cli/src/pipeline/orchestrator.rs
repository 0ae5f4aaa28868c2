//! Pipeline orchestrator - coordinates all components.
//!
//! Wires an event source into the relay, the relay into the buffer, and the
//! buffer into the configured sink. Supports NDJSON replay and mock
//! generation as inbound modes.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use batch_engine::EventBuffer;
use contracts::{EventSink, RelayConfig};
use dispatcher::{HttpSink, LogSink, RelayMetrics};
use ingestion::{EventFilter, JsonlEventSource, MockEventSource, Relay};
use tracing::{error, info, warn};

use super::RelayStats;

/// Pipeline configuration
pub struct PipelineConfig {
    /// The validated relay configuration
    pub relay_config: RelayConfig,

    /// Inbound event mode
    pub input: EventInput,

    /// Maximum number of inbound events to process (None = unlimited)
    pub max_events: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size for the event queue
    pub channel_capacity: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// Log payloads instead of sending HTTP requests
    pub log_only: bool,
}

/// Inbound event mode
#[derive(Debug, Clone)]
pub enum EventInput {
    /// Replay events from an NDJSON file
    Jsonl(PathBuf),

    /// Generate synthetic events at the given rate
    Mock { rate: f64 },
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    ///
    /// `shutdown` resolves when the process should stop; the final forced
    /// flush still runs on that path.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<RelayStats> {
        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let metrics = Arc::new(RelayMetrics::new());
        let filter = EventFilter::from_config(&self.config.relay_config.filter)?;

        if self.config.log_only {
            info!("Running in LOG-ONLY mode (payloads are logged, not sent)");
            let sink = LogSink::new("log_only", metrics.clone());
            self.run_with_sink(sink, metrics, filter, shutdown).await
        } else {
            let sink = HttpSink::from_config(&self.config.relay_config.sink, metrics.clone())?;
            info!(
                url = %self.config.relay_config.sink.request_url,
                method = %self.config.relay_config.sink.method,
                "HTTP sink configured"
            );
            self.run_with_sink(sink, metrics, filter, shutdown).await
        }
    }

    /// Common pipeline logic shared between sink modes
    async fn run_with_sink<S>(
        self,
        sink: S,
        metrics: Arc<RelayMetrics>,
        filter: EventFilter,
        shutdown: impl Future<Output = ()>,
    ) -> Result<RelayStats>
    where
        S: EventSink + Send + Sync + 'static,
    {
        let start_time = Instant::now();

        let buffer = EventBuffer::new(self.config.relay_config.buffer.clone(), sink);
        let flusher = buffer.clone().spawn_interval_flush();
        let relay = Relay::new(filter, buffer.clone());

        info!(
            max_bytes = self.config.relay_config.buffer.max_bytes,
            max_interval_secs = self.config.relay_config.buffer.max_interval_secs,
            "Event buffer configured"
        );

        // Setup the inbound event source
        let (rx, mock_source) = match &self.config.input {
            EventInput::Jsonl(path) => {
                info!(path = %path.display(), "Replaying NDJSON events");
                let source = JsonlEventSource::new(path);
                let rx = source
                    .start(self.config.channel_capacity, Some(relay.metrics()))
                    .await
                    .with_context(|| format!("Failed to open input {}", path.display()))?;
                (rx, None)
            }
            EventInput::Mock { rate } => {
                info!(rate, "Generating mock events");
                let source = MockEventSource::with_rate(*rate);
                let rx = source.start(self.config.channel_capacity);
                (rx, Some(source))
            }
        };

        let timeout_fired = async {
            match self.config.timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);
        tokio::pin!(timeout_fired);

        info!(max_events = ?self.config.max_events, "Pipeline running");

        let mut processed: u64 = 0;
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping pipeline...");
                    break;
                }
                _ = &mut timeout_fired => {
                    warn!(
                        timeout_secs = ?self.config.timeout.map(|t| t.as_secs()),
                        "Pipeline timed out"
                    );
                    break;
                }
                event = rx.recv() => match event {
                    Ok(event) => {
                        if let Err(e) = relay.on_event(event).await {
                            error!(error = %e, "Event rejected, stopping");
                            break;
                        }
                        processed += 1;

                        if let Some(max) = self.config.max_events {
                            if processed >= max {
                                info!(events = processed, "Reached max events limit");
                                break;
                            }
                        }
                    }
                    Err(_) => {
                        info!(events = processed, "Event source exhausted");
                        break;
                    }
                }
            }
        }

        // Stop the source, then force the final flush
        if let Some(source) = mock_source {
            source.stop();
        }
        drop(rx);

        info!("Shutting down pipeline...");
        relay.teardown().await;

        // The interval flusher exits at its next tick after close
        let _ = tokio::time::timeout(Duration::from_secs(5), flusher).await;

        let ingestion = relay.metrics().snapshot();
        let dispatch = metrics.snapshot();
        let stats = RelayStats {
            events_received: ingestion.events_received,
            events_filtered: ingestion.events_filtered,
            parse_errors: ingestion.parse_errors,
            total_requests: dispatch.total_requests,
            request_errors: dispatch.errors,
            duration: start_time.elapsed(),
            flush_summary: buffer.flush_summary(),
        };

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            eps = format!("{:.2}", stats.eps()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}
