#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sliprobe_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
workload:
  default_latncy_ms: 50 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.workload.default_latency_ms, 100);
    assert_eq!(cfg.workload.default_fail_rate_pct, 0);
    assert_eq!(cfg.metrics.latency_buckets.len(), 13);
    assert_eq!(cfg.metrics.latency_buckets[0], 0.005);
}

#[test]
fn defaults_match_minimal_file() {
    let from_file = config::load_from_str("version: 1\n").unwrap();
    let builtin = config::load(None).unwrap();
    assert_eq!(from_file.server.listen, builtin.server.listen);
    assert_eq!(from_file.metrics.latency_buckets, builtin.metrics.latency_buckets);
}

#[test]
fn rejects_bad_values() {
    let cases = [
        "version: 2\n",
        "version: 1\nserver: { listen: \"not-an-addr\" }\n",
        "version: 1\nserver: { request_timeout_ms: 10 }\n",
        "version: 1\nworkload: { default_fail_rate_pct: 101 }\n",
        "version: 1\nmetrics: { latency_buckets: [0.5, 0.1] }\n",
        "version: 1\nmetrics: { latency_buckets: [] }\n",
    ];
    for yaml in cases {
        assert!(config::load_from_str(yaml).is_err(), "accepted: {yaml}");
    }
}

#[test]
fn missing_file_is_reported() {
    let err = config::load(Some("/nonexistent/sliprobe.yaml")).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}
