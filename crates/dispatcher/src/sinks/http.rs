//! HttpSink - one request per buffered event
//!
//! Counting contract: `total_requests` is incremented before every attempt;
//! `errors` only when the transport call itself fails. Any HTTP response,
//! success status or not, counts as delivered (non-2xx is logged and
//! labeled in the dispatch metric, but does not touch the counters).

use std::sync::Arc;

use contracts::{Event, EventSink, RelayError, SinkEndpoint};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Url};
use tracing::{debug, instrument, warn};

use crate::metrics::RelayMetrics;
use crate::payload::ItemPayload;

/// Sink that POSTs (or PUTs, per config) item payloads to the ingestion API
pub struct HttpSink {
    name: String,
    client: Client,
    method: Method,
    url: Url,
    metrics: Arc<RelayMetrics>,
}

impl HttpSink {
    /// Create an HttpSink from the configured endpoint
    #[instrument(name = "http_sink_from_config", skip(endpoint, metrics))]
    pub fn from_config(
        endpoint: &SinkEndpoint,
        metrics: Arc<RelayMetrics>,
    ) -> Result<Self, RelayError> {
        let url = Url::parse(&endpoint.request_url).map_err(|e| {
            RelayError::config_validation("sink.request_url", format!("invalid URL: {e}"))
        })?;

        let method = Method::from_bytes(endpoint.method.as_str().as_bytes()).map_err(|e| {
            RelayError::config_validation("sink.method", format!("invalid method: {e}"))
        })?;

        let client = Client::builder()
            .default_headers(Self::default_headers())
            .build()
            .map_err(|e| RelayError::sink_request("http", format!("client build error: {e}")))?;

        debug!(url = %url, method = %method, "HttpSink configured");

        Ok(Self {
            name: "http".to_string(),
            client,
            method,
            url,
            metrics,
        })
    }

    /// Shared dispatch counters
    pub fn metrics(&self) -> &Arc<RelayMetrics> {
        &self.metrics
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("*"));
        headers
    }
}

impl EventSink for HttpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_sink_send",
        skip(self, event),
        fields(sink = %self.name, event_type = %event.event)
    )]
    async fn send(&self, event: &Event) -> Result<(), RelayError> {
        let payload = ItemPayload::from_event(event);

        // Counted before the attempt, whatever its outcome
        self.metrics.inc_total_requests();

        let result = self
            .client
            .request(self.method.clone(), self.url.clone())
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!(item_id = %payload.item_id, status = %status, "Item inserted");
                    observability::record_item_dispatched(&self.name, "success");
                } else {
                    // Still counted as delivered; only the transport can fail
                    warn!(
                        item_id = %payload.item_id,
                        status = %status,
                        "Non-success response from sink"
                    );
                    observability::record_item_dispatched(&self.name, "http_error");
                }
                Ok(())
            }
            Err(e) => {
                self.metrics.inc_errors();
                observability::record_item_dispatched(&self.name, "transport_error");
                Err(RelayError::sink_request(&self.name, e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::HttpMethod;

    fn endpoint(url: &str) -> SinkEndpoint {
        SinkEndpoint {
            request_url: url.to_string(),
            method: HttpMethod::Post,
        }
    }

    #[test]
    fn test_from_config_parses_endpoint() {
        let sink = HttpSink::from_config(
            &endpoint("http://localhost:8087/api/item/"),
            Arc::new(RelayMetrics::new()),
        )
        .unwrap();

        assert_eq!(sink.name(), "http");
        assert_eq!(sink.method, Method::POST);
        assert_eq!(sink.url.as_str(), "http://localhost:8087/api/item/");
    }

    #[test]
    fn test_from_config_rejects_bad_url() {
        let result = HttpSink::from_config(&endpoint("not a url"), Arc::new(RelayMetrics::new()));
        assert!(matches!(
            result,
            Err(RelayError::ConfigValidation { .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_counts_error() {
        // Nothing listens on this port; the connect fails at transport level
        let metrics = Arc::new(RelayMetrics::new());
        let sink =
            HttpSink::from_config(&endpoint("http://127.0.0.1:9/api/item/"), metrics.clone())
                .unwrap();

        let result = sink.send(&Event::new("purchase")).await;

        assert!(result.is_err());
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.errors(), 1);
    }
}
