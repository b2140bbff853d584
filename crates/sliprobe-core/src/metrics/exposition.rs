//! Prometheus text exposition format (0.0.4).
//!
//! Families come out in registration order, series sorted by label values.
//! Histogram lines for one series are written from a single snapshot so a
//! scrape never sees a bucket count that disagrees with `_count`.

use std::fmt::Write;

use crate::metrics::registry::{Family, Registry, Series};

/// `Content-Type` a scraper expects from `/metrics`.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Float rendering compatible with the Go/Python clients: integral values keep
/// one decimal (`1.0`), infinities become `+Inf`/`-Inf`.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let s = if v > 0.0 { "+Inf" } else { "-Inf" };
        s.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn label_pairs(names: &[String], values: &[String]) -> String {
    names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn braces(pairs: &str) -> String {
    if pairs.is_empty() {
        String::new()
    } else {
        format!("{{{pairs}}}")
    }
}

fn sorted<V: Clone>(m: &dashmap::DashMap<Vec<String>, V>) -> Vec<(Vec<String>, V)> {
    let mut rows: Vec<_> = m
        .iter()
        .map(|r| (r.key().clone(), r.value().clone()))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

fn render_family(f: &Family, out: &mut String) {
    let name = &f.name;
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(&f.help));
    let _ = writeln!(out, "# TYPE {} {}", name, f.kind());

    match &f.series {
        Series::Counter(m) => {
            for (key, c) in sorted(m) {
                let labels = braces(&label_pairs(&f.label_names, &key));
                let _ = writeln!(out, "{}{} {}", name, labels, c.get());
            }
        }
        Series::Gauge(m) => {
            for (key, g) in sorted(m) {
                let labels = braces(&label_pairs(&f.label_names, &key));
                let _ = writeln!(out, "{}{} {}", name, labels, g.get());
            }
        }
        Series::Histogram { cells, .. } => {
            for (key, h) in sorted(cells) {
                let snap = h.snapshot();
                let pairs = label_pairs(&f.label_names, &key);
                let prefix = if pairs.is_empty() {
                    String::new()
                } else {
                    format!("{pairs},")
                };
                for (le, count) in &snap.buckets {
                    let _ = writeln!(
                        out,
                        "{}_bucket{{{}le=\"{}\"}} {}",
                        name,
                        prefix,
                        format_float(*le),
                        count
                    );
                }
                let _ = writeln!(out, "{}_bucket{{{}le=\"+Inf\"}} {}", name, prefix, snap.count);
                let labels = braces(&pairs);
                let _ = writeln!(out, "{}_sum{} {}", name, labels, format_float(snap.sum));
                let _ = writeln!(out, "{}_count{} {}", name, labels, snap.count);
            }
        }
    }
}

/// Render every family of `registry`.
pub fn render(registry: &Registry) -> String {
    let mut out = String::new();
    for family in registry.families() {
        render_family(&family, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_look_like_client_libraries() {
        assert_eq!(format_float(0.005), "0.005");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(10.0), "10.0");
        assert_eq!(format_float(0.75), "0.75");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
    }

    #[test]
    fn label_values_are_escaped() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }
}
