//! sliprobe core: metric instruments, the registry that owns them, and the
//! Prometheus text exposition formatter.
//!
//! This crate carries no HTTP or runtime dependencies. The server crate layers
//! request instrumentation on top of it; tests can drive a `Registry` directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Metrics accounting
//! runs on every request path, so every fallible operation surfaces as
//! `ProbeError` instead.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{ProbeError, Result};
