//! Pool observability.
//!
//! Counters and latency percentiles for submitted, executed, failed and
//! discarded tasks. Log output goes through `tracing`.

pub mod metrics;

pub use metrics::{Metrics, MetricsSnapshot};
