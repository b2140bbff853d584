//! HTTP request accounting.
//!
//! - `http_requests_total{method,path,status}` : counter, one per finished request
//! - `http_inprogress_requests{method,path}`   : gauge, requests inside the layer
//! - `http_request_duration_seconds{method,path}` : histogram of wall time
//!
//! Paths are recorded literally, not as route templates. That is only safe
//! because the instrumented route set is tiny and fixed; unmatched paths are
//! answered by an uninstrumented fallback.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use sliprobe_core::error::Result;
use sliprobe_core::metrics::{Gauge, MetricKind, Registry};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const IN_PROGRESS: &str = "http_inprogress_requests";
pub const DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Status recorded when the request future is dropped before any response
/// exists (client went away mid-request).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// The three HTTP families, registered once against an injected registry.
#[derive(Clone)]
pub struct HttpMetrics {
    registry: Arc<Registry>,
}

impl HttpMetrics {
    /// Register the families. A name clash is a startup error.
    pub fn register(registry: Arc<Registry>, latency_buckets: &[f64]) -> Result<Self> {
        registry.register(
            REQUESTS_TOTAL,
            "Total number of HTTP responses, labeled by method/path/status.",
            MetricKind::Counter,
            &["method", "path", "status"],
            None,
        )?;
        registry.register(
            IN_PROGRESS,
            "Number of in-progress HTTP requests.",
            MetricKind::Gauge,
            &["method", "path"],
            None,
        )?;
        registry.register(
            DURATION_SECONDS,
            "Request latency in seconds.",
            MetricKind::Histogram,
            &["method", "path"],
            Some(latency_buckets),
        )?;
        Ok(Self { registry })
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Entry step: start the clock and bump the in-progress gauge.
    pub fn enter(&self, method: &str, path: &str) -> RequestGuard {
        let inflight = match self.registry.gauge(IN_PROGRESS, &[method, path]) {
            Ok(g) => {
                g.inc();
                Some(g)
            }
            Err(e) => {
                tracing::warn!(error = %e, "in-progress gauge unavailable");
                None
            }
        };
        RequestGuard {
            registry: Arc::clone(&self.registry),
            method: method.to_string(),
            path: path.to_string(),
            start: Some(Instant::now()),
            status: None,
            inflight,
        }
    }
}

/// Exit step bound to scope: dropping the guard records duration and status
/// and releases the in-progress slot, whether the handler returned, panicked,
/// timed out, or the future was cancelled.
pub struct RequestGuard {
    registry: Arc<Registry>,
    method: String,
    path: String,
    start: Option<Instant>,
    status: Option<u16>,
    inflight: Option<Gauge>,
}

impl RequestGuard {
    /// Record the status the response is leaving with.
    pub fn complete(&mut self, status: StatusCode) {
        self.status = Some(status.as_u16());
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let elapsed = elapsed_secs(self.start);
        let status = self.status.unwrap_or(CLIENT_CLOSED_REQUEST).to_string();
        let labels = [self.method.as_str(), self.path.as_str()];

        match self.registry.histogram(DURATION_SECONDS, &labels) {
            Ok(h) => h.observe(elapsed),
            Err(e) => tracing::warn!(error = %e, "latency histogram unavailable"),
        }
        match self
            .registry
            .counter(REQUESTS_TOTAL, &[self.method.as_str(), self.path.as_str(), &status])
        {
            Ok(c) => c.inc(),
            Err(e) => tracing::warn!(error = %e, "request counter unavailable"),
        }
        if let Some(g) = self.inflight.take() {
            g.dec();
        }
    }
}

/// Seconds since `start`, never negative; a missing start counts as zero.
fn elapsed_secs(start: Option<Instant>) -> f64 {
    start
        .map(|t| t.elapsed().as_secs_f64())
        .unwrap_or(0.0)
        .max(0.0)
}

/// Axum middleware wrapping one handler invocation in a [`RequestGuard`].
pub async fn track(State(metrics): State<HttpMetrics>, req: Request, next: Next) -> Response {
    let mut guard = metrics.enter(req.method().as_str(), req.uri().path());
    let resp = next.run(req).await;
    guard.complete(resp.status());
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> HttpMetrics {
        HttpMetrics::register(Arc::new(Registry::new()), &[0.01, 0.1, 1.0]).unwrap()
    }

    #[test]
    fn registering_twice_fails() {
        let m = metrics();
        assert!(HttpMetrics::register(Arc::clone(m.registry()), &[1.0]).is_err());
    }

    #[test]
    fn guard_balances_gauge_and_records_status() {
        let m = metrics();
        let r = m.registry();
        {
            let mut g = m.enter("GET", "/work");
            assert_eq!(r.gauge(IN_PROGRESS, &["GET", "/work"]).unwrap().get(), 1);
            g.complete(StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert_eq!(r.gauge(IN_PROGRESS, &["GET", "/work"]).unwrap().get(), 0);
        assert_eq!(
            r.counter(REQUESTS_TOTAL, &["GET", "/work", "500"]).unwrap().get(),
            1
        );
        let snap = r.histogram(DURATION_SECONDS, &["GET", "/work"]).unwrap().snapshot();
        assert_eq!(snap.count, 1);
    }

    #[test]
    fn dropped_without_response_counts_as_client_closed() {
        let m = metrics();
        drop(m.enter("GET", "/healthz"));
        let r = m.registry();
        assert_eq!(
            r.counter(REQUESTS_TOTAL, &["GET", "/healthz", "499"]).unwrap().get(),
            1
        );
        assert_eq!(r.gauge(IN_PROGRESS, &["GET", "/healthz"]).unwrap().get(), 0);
    }

    #[test]
    fn missing_start_observes_zero() {
        let m = metrics();
        let mut g = m.enter("GET", "/work");
        g.start = None;
        g.complete(StatusCode::OK);
        drop(g);
        let snap = m
            .registry()
            .histogram(DURATION_SECONDS, &["GET", "/work"])
            .unwrap()
            .snapshot();
        assert_eq!(snap.sum, 0.0);
        assert_eq!(snap.buckets[0], (0.01, 1));
        assert_eq!(elapsed_secs(None), 0.0);
    }
}
