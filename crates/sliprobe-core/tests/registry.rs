//! Registry contract tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::thread;

use sliprobe_core::error::ClientCode;
use sliprobe_core::metrics::{Instrument, MetricKind, Registry};
use sliprobe_core::ProbeError;

const BUCKETS: &[f64] = &[0.01, 0.1, 1.0];

fn registry() -> Registry {
    let r = Registry::new();
    r.register("reqs_total", "Requests.", MetricKind::Counter, &["method", "status"], None)
        .unwrap();
    r.register("inflight", "In flight.", MetricKind::Gauge, &["method"], None)
        .unwrap();
    r.register("latency_seconds", "Latency.", MetricKind::Histogram, &["method"], Some(BUCKETS))
        .unwrap();
    r
}

#[test]
fn duplicate_registration_fails() {
    let r = registry();
    let err = r
        .register("inflight", "again", MetricKind::Counter, &[], None)
        .expect_err("must fail");
    assert!(matches!(err, ProbeError::DuplicateMetric(ref n) if n == "inflight"));
    assert_eq!(err.client_code(), ClientCode::DuplicateMetric);
}

#[test]
fn histogram_requires_valid_buckets() {
    let r = Registry::new();
    assert!(r
        .register("h", "h", MetricKind::Histogram, &[], None)
        .is_err());
    assert!(r
        .register("h", "h", MetricKind::Histogram, &[], Some(&[1.0, 0.5]))
        .is_err());
    assert!(r
        .register("h", "h", MetricKind::Histogram, &["le"], Some(&[1.0]))
        .is_err());
    // failed attempts must not reserve the name
    r.register("h", "h", MetricKind::Histogram, &[], Some(&[1.0]))
        .unwrap();
}

#[test]
fn get_creates_cells_per_label_combination() {
    let r = registry();
    r.counter("reqs_total", &["GET", "200"]).unwrap().inc();
    r.counter("reqs_total", &["GET", "200"]).unwrap().inc();
    r.counter("reqs_total", &["GET", "500"]).unwrap().inc();

    assert_eq!(r.counter("reqs_total", &["GET", "200"]).unwrap().get(), 2);
    assert_eq!(r.counter("reqs_total", &["GET", "500"]).unwrap().get(), 1);
    assert!(r.lookup("reqs_total", &["POST", "200"]).unwrap().is_none());
    assert!(matches!(r.get("inflight", &["GET"]).unwrap(), Instrument::Gauge(_)));
}

#[test]
fn lookup_errors_are_typed() {
    let r = registry();
    assert!(matches!(
        r.get("nope", &[]).unwrap_err(),
        ProbeError::UnknownMetric(_)
    ));
    assert!(matches!(
        r.get("reqs_total", &["GET"]).unwrap_err(),
        ProbeError::LabelArity { expected: 2, got: 1, .. }
    ));
    assert!(matches!(
        r.gauge("reqs_total", &["GET", "200"]).unwrap_err(),
        ProbeError::KindMismatch { expected: "gauge", actual: "counter", .. }
    ));
    assert_eq!(r.kind_of("latency_seconds"), Some(MetricKind::Histogram));
}

#[test]
fn concurrent_updates_are_not_lost() {
    let r = registry();
    thread::scope(|s| {
        for t in 0..8 {
            let r = &r;
            s.spawn(move || {
                let method = if t % 2 == 0 { "GET" } else { "POST" };
                for _ in 0..1000 {
                    let g = r.gauge("inflight", &[method]).unwrap();
                    g.inc();
                    r.counter("reqs_total", &[method, "200"]).unwrap().inc();
                    r.histogram("latency_seconds", &[method]).unwrap().observe(0.05);
                    g.dec();
                }
            });
        }
    });

    for method in ["GET", "POST"] {
        assert_eq!(r.counter("reqs_total", &[method, "200"]).unwrap().get(), 4000);
        assert_eq!(r.gauge("inflight", &[method]).unwrap().get(), 0);
        let snap = r.histogram("latency_seconds", &[method]).unwrap().snapshot();
        assert_eq!(snap.count, 4000);
        assert_eq!(snap.buckets, vec![(0.01, 0), (0.1, 4000), (1.0, 4000)]);
    }
}
