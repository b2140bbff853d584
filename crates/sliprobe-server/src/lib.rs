//! sliprobe server library entry.
//!
//! Synthetic HTTP workload with controllable latency and failure rate, plus
//! liveness and Prometheus endpoints, for checking dashboards and SLI queries
//! against known inputs. Consumed by the `sliprobe` binary, the load
//! generator, and integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod loadgen;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
