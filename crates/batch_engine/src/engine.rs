//! EventBuffer - swap-and-drain flush engine
//!
//! Two triggers mutate the buffer: the ingestion path calling `add`, and the
//! background interval task calling `flush`. Both take the state lock only
//! for the push/swap itself; dispatch happens on the drained batch, which the
//! flush owns exclusively. A fresh state accepts new events while a prior
//! drain is still in flight, so ordering is guaranteed within one flush only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use contracts::{BufferConfig, Event, EventSink, RelayError};
use observability::FlushStatsAggregator;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument};

use crate::buffer::BufferState;

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Accumulated bytes reached the size threshold
    Size,
    /// The background interval fired
    Interval,
    /// Teardown forced a final drain
    Shutdown,
}

impl FlushTrigger {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Interval => "interval",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Buffering and flush-dispatch engine
///
/// Owns the current `BufferState` behind a mutex that is never held across an
/// await point. Flushing atomically swaps in a fresh state and then drains
/// the old one through the sink, one event at a time, in arrival order.
pub struct EventBuffer<S> {
    state: Mutex<BufferState>,
    stats: Mutex<FlushStatsAggregator>,
    thresholds: BufferConfig,
    sink: S,
    closed: AtomicBool,
}

impl<S> EventBuffer<S>
where
    S: EventSink + Send + Sync,
{
    /// Create a new buffer around a sink
    pub fn new(thresholds: BufferConfig, sink: S) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BufferState::new()),
            stats: Mutex::new(FlushStatsAggregator::new()),
            thresholds,
            sink,
            closed: AtomicBool::new(false),
        })
    }

    /// Append an eligible event
    ///
    /// If the accumulated byte total reaches the size threshold, the flush
    /// runs before this call returns; other callers keep adding to the fresh
    /// state in the meantime.
    ///
    /// # Errors
    /// `RelayError::BufferClosed` once `shutdown` has run.
    pub async fn add(&self, event: Event, size: usize) -> Result<(), RelayError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RelayError::buffer_closed(&event.event));
        }

        let drained = {
            let mut state = self.lock_state();
            state.push(event, size);
            observability::record_buffer_bytes(state.total_bytes());

            if state.total_bytes() >= self.thresholds.max_bytes {
                Some(std::mem::replace(&mut *state, BufferState::new()))
            } else {
                None
            }
        };

        if let Some(batch) = drained {
            self.drain(batch, FlushTrigger::Size).await;
        }

        Ok(())
    }

    /// Drain everything currently buffered
    ///
    /// A flush with zero items is a no-op: no swap, no dispatch. Returns the
    /// number of items dispatched; never errors.
    #[instrument(name = "event_buffer_flush", skip(self), fields(trigger = trigger.as_str()))]
    pub async fn flush(&self, trigger: FlushTrigger) -> usize {
        let batch = {
            let mut state = self.lock_state();
            if state.is_empty() {
                return 0;
            }
            std::mem::replace(&mut *state, BufferState::new())
        };

        self.drain(batch, trigger).await
    }

    /// Spawn the background interval flusher
    ///
    /// Fires every `max_interval_secs`; a tick with an empty buffer is a
    /// no-op. The interval restarts after each flush regardless of its
    /// outcome. The task exits once the buffer is closed.
    pub fn spawn_interval_flush(self: Arc<Self>) -> JoinHandle<()>
    where
        S: 'static,
    {
        let buffer = self;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(buffer.thresholds.max_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; skip it.
            interval.tick().await;

            debug!(
                interval_secs = buffer.thresholds.max_interval_secs,
                "interval flusher started"
            );

            loop {
                interval.tick().await;
                if buffer.closed.load(Ordering::Acquire) {
                    break;
                }
                buffer.flush(FlushTrigger::Interval).await;
            }

            debug!("interval flusher stopped");
        })
    }

    /// Close the buffer and force a final flush
    ///
    /// Idempotent. Awaits completion of the final drain; events arriving
    /// after shutdown are rejected by `add`.
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let drained = self.flush(FlushTrigger::Shutdown).await;
        info!(items = drained, "Event buffer shut down");
    }

    /// Whether `shutdown` has run
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Items currently buffered (diagnostics)
    pub fn pending_items(&self) -> usize {
        self.lock_state().len()
    }

    /// Bytes currently buffered (diagnostics)
    pub fn pending_bytes(&self) -> usize {
        self.lock_state().total_bytes()
    }

    /// The sink this buffer dispatches to
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Snapshot of aggregated flush statistics
    pub fn flush_summary(&self) -> observability::FlushSummary {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Dispatch a drained batch sequentially, in arrival order
    ///
    /// A sink error is logged and counted; the remaining items of the same
    /// batch still go out. Nothing propagates to the caller.
    async fn drain(&self, batch: BufferState, trigger: FlushTrigger) -> usize {
        let items = batch.len();
        let bytes = batch.total_bytes();
        let age_ms = batch.age().as_secs_f64() * 1000.0;
        let started = Instant::now();
        let mut send_errors = 0usize;

        for item in batch.into_items() {
            if let Err(e) = self.sink.send(&item.event).await {
                send_errors += 1;
                error!(
                    sink = %self.sink.name(),
                    event_type = %item.event.event,
                    error = %e,
                    "Dispatch failed"
                );
            }
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        observability::record_flush(trigger.as_str(), items, bytes, elapsed_ms);
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(items, bytes, send_errors, elapsed_ms);

        info!(
            trigger = trigger.as_str(),
            items,
            bytes,
            errors = send_errors,
            elapsed_ms = format!("{elapsed_ms:.2}"),
            age_ms = format!("{age_ms:.0}"),
            "Flush complete"
        );

        items
    }

    fn lock_state(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
