//! In-process metric instruments with Prometheus text exposition.
//!
//! A [`Registry`] owns named instrument families. Each family has a fixed label
//! schema and holds one cell per label combination; cells are created on first
//! use and live until the registry is dropped.

pub mod exposition;
pub mod instruments;
pub mod registry;

pub use exposition::CONTENT_TYPE;
pub use instruments::{Counter, Gauge, Histogram, HistogramSnapshot};
pub use registry::{Instrument, MetricKind, Registry};
