//! Request instrumentation.
//!
//! Every instrumented request goes through `http_metrics::track`, which feeds
//! the three HTTP families in the shared `Registry`. `/metrics` is routed
//! outside the layer so scrapes never show up in the numbers they report.

pub mod http_metrics;

pub use http_metrics::{track, HttpMetrics, RequestGuard};
