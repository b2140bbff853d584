//! Per-label-combination metric cells.
//!
//! Handles are cheap to clone and share the underlying cell, so a request can
//! hold one across an `.await` without touching the registry again. Counters
//! and gauges are single atomics. A histogram series sits behind its own mutex
//! so bucket counts, sum, and count always move together.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic counter cell.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, v: u64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Up/down gauge cell.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    value: Arc<AtomicI64>,
}

impl Gauge {
    /// Increment by 1.
    pub fn inc(&self) {
        self.add(1);
    }

    /// Decrement by 1.
    pub fn dec(&self) {
        self.add(-1);
    }

    /// Add an arbitrary signed delta.
    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct HistogramState {
    // cumulative: buckets[i] counts observations <= bounds[i]
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

#[derive(Debug)]
struct HistogramCell {
    bounds: Arc<[f64]>,
    state: Mutex<HistogramState>,
}

/// Histogram series with fixed upper bounds and an implicit `+Inf` bucket.
#[derive(Debug, Clone)]
pub struct Histogram {
    cell: Arc<HistogramCell>,
}

impl Histogram {
    pub(crate) fn new(bounds: Arc<[f64]>) -> Self {
        let state = HistogramState {
            buckets: vec![0; bounds.len()],
            count: 0,
            sum: 0.0,
        };
        Self {
            cell: Arc::new(HistogramCell {
                bounds,
                state: Mutex::new(state),
            }),
        }
    }

    /// Record one observation. Every bucket whose bound is >= `v` is bumped.
    pub fn observe(&self, v: f64) {
        let bounds = &self.cell.bounds;
        let mut st = self.cell.state.lock();
        st.count += 1;
        st.sum += v;
        for (i, &le) in bounds.iter().enumerate() {
            if v <= le {
                st.buckets[i] += 1;
            }
        }
    }

    /// Copy the series out under a single lock acquisition.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let st = self.cell.state.lock();
        HistogramSnapshot {
            buckets: self
                .cell
                .bounds
                .iter()
                .copied()
                .zip(st.buckets.iter().copied())
                .collect(),
            count: st.count,
            sum: st.sum,
        }
    }
}

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper_bound, cumulative_count)` in ascending bound order, without `+Inf`.
    pub buckets: Vec<(f64, u64)>,
    /// Total observations; this is also the `+Inf` bucket.
    pub count: u64,
    pub sum: f64,
}

impl HistogramSnapshot {
    /// Cumulative count for the smallest bucket that holds `v`, or `count`
    /// when `v` is above every finite bound.
    pub fn count_le(&self, v: f64) -> u64 {
        self.buckets
            .iter()
            .find(|(le, _)| v <= *le)
            .map(|(_, c)| *c)
            .unwrap_or(self.count)
    }
}
