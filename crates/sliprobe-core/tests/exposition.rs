//! Text exposition output tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sliprobe_core::metrics::{MetricKind, Registry};

#[test]
fn renders_all_kinds_in_registration_order() {
    let r = Registry::new();
    r.register("b_total", "Counter help.", MetricKind::Counter, &["path", "status"], None)
        .unwrap();
    r.register("a_inflight", "Gauge help.", MetricKind::Gauge, &["path"], None)
        .unwrap();
    r.register("c_seconds", "Histogram help.", MetricKind::Histogram, &["path"], Some(&[0.1, 1.0]))
        .unwrap();

    r.counter("b_total", &["/work", "500"]).unwrap().inc();
    r.counter("b_total", &["/work", "200"]).unwrap().add(3);
    r.gauge("a_inflight", &["/work"]).unwrap().set(2);
    let h = r.histogram("c_seconds", &["/work"]).unwrap();
    h.observe(0.0625);
    h.observe(0.5);
    h.observe(4.0);

    let expected = "\
# HELP b_total Counter help.
# TYPE b_total counter
b_total{path=\"/work\",status=\"200\"} 3
b_total{path=\"/work\",status=\"500\"} 1
# HELP a_inflight Gauge help.
# TYPE a_inflight gauge
a_inflight{path=\"/work\"} 2
# HELP c_seconds Histogram help.
# TYPE c_seconds histogram
c_seconds_bucket{path=\"/work\",le=\"0.1\"} 1
c_seconds_bucket{path=\"/work\",le=\"1.0\"} 2
c_seconds_bucket{path=\"/work\",le=\"+Inf\"} 3
c_seconds_sum{path=\"/work\"} 4.5625
c_seconds_count{path=\"/work\"} 3
";
    assert_eq!(r.render(), expected);
}

#[test]
fn unlabeled_and_empty_families() {
    let r = Registry::new();
    r.register("up", "Up.", MetricKind::Gauge, &[], None).unwrap();
    r.register("never_total", "Never touched.", MetricKind::Counter, &["x"], None)
        .unwrap();
    r.gauge("up", &[]).unwrap().set(1);

    let out = r.render();
    assert!(out.contains("\nup 1\n"));
    assert!(out.contains("# TYPE never_total counter\n"));
    assert!(!out.contains("never_total{"));
}
