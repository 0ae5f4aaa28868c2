//! # Batch Engine
//!
//! Event accumulation and flush dispatch.
//!
//! Responsibilities:
//! - Accumulate eligible events with their serialized sizes
//! - Trigger a flush when the byte or interval threshold is crossed
//! - Swap-then-drain: the drained batch is dispatched sequentially while a
//!   fresh buffer keeps accepting events
//! - Contain per-item sink failures inside the flush

mod buffer;
mod engine;

pub use engine::{EventBuffer, FlushTrigger};
