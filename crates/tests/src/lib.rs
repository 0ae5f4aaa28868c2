//! # Integration Tests
//!
//! End-to-end tests over the full relay pipeline.
//!
//! Covers:
//! - Filter -> buffer -> sink data flow with threshold-driven flushes
//! - Teardown drain semantics
//! - Dispatch counting against a real local HTTP listener

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use batch_engine::{EventBuffer, FlushTrigger};
    use contracts::{BufferConfig, Event, EventSink, RelayError};
    use dispatcher::{LogSink, RelayMetrics};
    use ingestion::{EventFilter, MockEventSource, MockSourceConfig, Relay};
    use serde_json::json;

    /// Sink that records dispatch order and honors the counting contract:
    /// every attempt bumps `total_requests`, only transport failures bump
    /// `errors`.
    struct RecordingSink {
        metrics: Arc<RelayMetrics>,
        sent: Mutex<Vec<String>>,
        fail_all: AtomicBool,
    }

    impl RecordingSink {
        fn new(metrics: Arc<RelayMetrics>) -> Self {
            Self {
                metrics,
                sent: Mutex::new(Vec::new()),
                fail_all: AtomicBool::new(false),
            }
        }

        fn sent_ids(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, event: &Event) -> Result<(), RelayError> {
            self.metrics.inc_total_requests();
            if self.fail_all.load(Ordering::Relaxed) {
                self.metrics.inc_errors();
                return Err(RelayError::sink_request("recording", "simulated outage"));
            }
            let id = event
                .property_str("item_id")
                .unwrap_or_else(|| event.event.clone());
            self.sent.lock().unwrap().push(id);
            Ok(())
        }
    }

    /// Build an event whose serialized size lands exactly on `target` bytes
    fn sized_event(event_type: &str, item_id: &str, target: usize) -> Event {
        let mut event = Event::new(event_type);
        event
            .properties
            .insert("item_id".to_string(), json!(item_id));
        event.properties.insert("pad".to_string(), json!(""));

        let base = event.serialized_size();
        assert!(base <= target, "target {target} below base size {base}");
        let pad = "x".repeat(target - base);
        event.properties.insert("pad".to_string(), json!(pad));

        assert_eq!(event.serialized_size(), target);
        event
    }

    fn relay_over(
        allow: &str,
        max_bytes: usize,
        metrics: Arc<RelayMetrics>,
    ) -> Relay<RecordingSink> {
        let buffer = EventBuffer::new(
            BufferConfig {
                max_bytes,
                max_interval_secs: 60,
            },
            RecordingSink::new(metrics),
        );
        Relay::new(EventFilter::from_list(allow).unwrap(), buffer)
    }

    /// The specification scenario: allow-list {"purchase"}, max_bytes 1000.
    /// purchase(400), view(100), purchase(700) -> the view is filtered, the
    /// second purchase crosses the threshold and both purchases go out in
    /// order; total_requests becomes 2.
    #[tokio::test]
    async fn test_threshold_scenario() {
        let metrics = Arc::new(RelayMetrics::new());
        let relay = relay_over("purchase", 1000, metrics.clone());

        relay
            .on_event(sized_event("purchase", "first", 400))
            .await
            .unwrap();
        relay
            .on_event(sized_event("view", "noise", 100))
            .await
            .unwrap();

        // Nothing flushed yet: 400 < 1000, the view never reached the buffer
        assert_eq!(relay.buffer().pending_items(), 1);
        assert_eq!(relay.buffer().pending_bytes(), 400);
        assert_eq!(metrics.total_requests(), 0);

        relay
            .on_event(sized_event("purchase", "second", 700))
            .await
            .unwrap();

        // 400 + 700 >= 1000 drained both purchases, in arrival order
        assert_eq!(relay.buffer().pending_items(), 0);
        assert_eq!(relay.buffer().sink().sent_ids(), vec!["first", "second"]);
        assert_eq!(metrics.total_requests(), 2);
        assert_eq!(metrics.errors(), 0);

        relay.teardown().await;
    }

    /// Teardown with M items still buffered performs exactly M attempts.
    #[tokio::test]
    async fn test_teardown_drains_buffered_items() {
        let metrics = Arc::new(RelayMetrics::new());
        let relay = relay_over("purchase", 1_000_000, metrics.clone());

        for i in 0..4 {
            relay
                .on_event(sized_event("purchase", &format!("item-{i}"), 300))
                .await
                .unwrap();
        }
        assert_eq!(metrics.total_requests(), 0);

        relay.teardown().await;

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(
            relay.buffer().sink().sent_ids(),
            vec!["item-0", "item-1", "item-2", "item-3"]
        );

        // Events after teardown fail loudly
        let late = relay.on_event(sized_event("purchase", "late", 300)).await;
        assert!(matches!(late, Err(RelayError::BufferClosed { .. })));
    }

    /// A transport failure on one item does not abort the flush and nothing
    /// escapes `flush`; every item is still attempted and counted.
    #[tokio::test]
    async fn test_transport_failures_are_isolated() {
        let metrics = Arc::new(RelayMetrics::new());
        let buffer = EventBuffer::new(
            BufferConfig {
                max_bytes: 1_000_000,
                max_interval_secs: 60,
            },
            RecordingSink::new(metrics.clone()),
        );
        buffer.sink().fail_all.store(true, Ordering::Relaxed);

        for i in 0..3 {
            buffer
                .add(sized_event("purchase", &format!("item-{i}"), 200), 200)
                .await
                .unwrap();
        }

        let drained = buffer.flush(FlushTrigger::Shutdown).await;

        assert_eq!(drained, 3);
        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.errors(), 3);
        assert_eq!(buffer.flush_summary().total_send_errors, 3);
    }

    /// Mock source -> Relay -> LogSink: only allow-listed types are counted
    /// as requests.
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        let metrics = Arc::new(RelayMetrics::new());
        let buffer = EventBuffer::new(
            BufferConfig {
                max_bytes: 1_000_000,
                max_interval_secs: 60,
            },
            LogSink::new("e2e_log", metrics.clone()),
        );
        let relay = Relay::new(EventFilter::from_list("purchase").unwrap(), buffer);

        // Default mock config cycles purchase/view/cart_add
        let source = MockEventSource::new(MockSourceConfig {
            frequency_hz: 1000.0,
            ..Default::default()
        });
        let rx = source.start(100);

        for _ in 0..9 {
            let event = rx.recv().await.unwrap();
            relay.on_event(event).await.unwrap();
        }
        source.stop();

        let snapshot = relay.metrics().snapshot();
        assert_eq!(snapshot.events_received, 9);
        assert_eq!(snapshot.events_filtered, 6);
        assert_eq!(snapshot.events_eligible(), 3);

        relay.teardown().await;

        // Exactly the three purchases were dispatched
        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.errors(), 0);
    }

    /// Config -> filter -> sink wiring: a loaded configuration yields a
    /// working filter and a constructible HTTP sink.
    #[tokio::test]
    async fn test_config_to_pipeline_wiring() {
        let config = config_loader::ConfigLoader::load_from_str(
            r#"
[filter]
events_to_include = "purchase, signup"

[sink]
request_url = "http://localhost:8087/api/item/"
method = "post"

[buffer]
max_bytes = 1000
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let filter = EventFilter::from_config(&config.filter).unwrap();
        assert!(filter.is_eligible(&Event::new("signup")));
        assert!(!filter.is_eligible(&Event::new("view")));

        let metrics = Arc::new(RelayMetrics::new());
        let sink = dispatcher::HttpSink::from_config(&config.sink, metrics).unwrap();
        let buffer = EventBuffer::new(config.buffer.clone(), sink);

        assert_eq!(buffer.pending_items(), 0);
        buffer.shutdown().await;
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::Arc;

    use contracts::{Event, EventSink, HttpMethod, SinkEndpoint};
    use dispatcher::{HttpSink, RelayMetrics};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one HTTP request, return its raw head+body, and answer with
    /// the given status line.
    async fn one_shot_server(listener: TcpListener, status_line: &'static str) -> Vec<u8> {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            request.extend_from_slice(&chunk[..n]);
            if let Some(header_end) = find_header_end(&request) {
                let content_length = parse_content_length(&request[..header_end]);
                if request.len() >= header_end + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        let response =
            format!("{status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        request
    }

    fn find_header_end(bytes: &[u8]) -> Option<usize> {
        bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|i| i + 4)
    }

    fn parse_content_length(head: &[u8]) -> usize {
        let head = String::from_utf8_lossy(head);
        head.lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse().ok())?
            })
            .unwrap_or(0)
    }

    fn purchase_event() -> Event {
        let mut event = Event::new("purchase");
        for (key, value) in [
            ("item_type", json!("shirt")),
            ("item_id", json!("sku-1")),
            ("item_category", json!("apparel")),
            ("item_price", json!("19.99")),
            ("item_name", json!("Blue Shirt")),
        ] {
            event.properties.insert(key.to_string(), value);
        }
        event
    }

    async fn sink_for(listener: &TcpListener, metrics: Arc<RelayMetrics>) -> HttpSink {
        let addr = listener.local_addr().unwrap();
        HttpSink::from_config(
            &SinkEndpoint {
                request_url: format!("http://{addr}/api/item/"),
                method: HttpMethod::Post,
            },
            metrics,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_http_sink_sends_expected_request() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let metrics = Arc::new(RelayMetrics::new());
        let sink = sink_for(&listener, metrics.clone()).await;

        let server = tokio::spawn(one_shot_server(listener, "HTTP/1.1 200 OK"));

        sink.send(&purchase_event()).await.unwrap();

        let request = server.await.unwrap();
        let raw = String::from_utf8_lossy(&request);

        // Request line and headers
        assert!(raw.starts_with("POST /api/item/ HTTP/1.1\r\n"), "got: {raw}");
        let head = raw.to_lowercase();
        assert!(head.contains("content-type: application/json"));
        assert!(head.contains("accept: application/json"));
        assert!(head.contains("user-agent: *"));

        // Body is the structured item payload
        let body_start = raw.find("\r\n\r\n").unwrap() + 4;
        let body: Value = serde_json::from_str(&raw[body_start..]).unwrap();
        assert_eq!(body["ItemId"], "shirt_sku-1");
        assert_eq!(body["Categories"], json!(["apparel"]));
        assert_eq!(body["Labels"], json!(["Blue Shirt"]));
        assert_eq!(body["Comment"], "19.99");
        assert_eq!(body["IsHidden"], true);

        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.errors(), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_counted_as_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let metrics = Arc::new(RelayMetrics::new());
        let sink = sink_for(&listener, metrics.clone()).await;

        let server = tokio::spawn(one_shot_server(
            listener,
            "HTTP/1.1 500 Internal Server Error",
        ));

        // The exchange completed, so the send itself succeeds
        let result = sink.send(&purchase_event()).await;
        server.await.unwrap();

        assert!(result.is_ok());
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.errors(), 0);
    }

    #[tokio::test]
    async fn test_connection_refused_counts_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let metrics = Arc::new(RelayMetrics::new());
        let sink = HttpSink::from_config(
            &SinkEndpoint {
                request_url: format!("http://{addr}/api/item/"),
                method: HttpMethod::Post,
            },
            metrics.clone(),
        )
        .unwrap();

        let result = sink.send(&purchase_event()).await;

        assert!(result.is_err());
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.errors(), 1);
    }
}
