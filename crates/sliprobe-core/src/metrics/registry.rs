//! Metric registry: named families, each with a fixed label schema.
//!
//! The name index is a `DashMap`, and every family keeps its own `DashMap` of
//! label combinations. Two requests touching different series never wait on
//! the same lock except for a brief shard read.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::error::{ProbeError, Result};
use crate::metrics::instruments::{Counter, Gauge, Histogram};

/// Instrument kind, as written on the `# TYPE` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to one label combination of any kind.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Instrument {
    pub fn kind(&self) -> MetricKind {
        match self {
            Instrument::Counter(_) => MetricKind::Counter,
            Instrument::Gauge(_) => MetricKind::Gauge,
            Instrument::Histogram(_) => MetricKind::Histogram,
        }
    }
}

pub(crate) enum Series {
    Counter(DashMap<Vec<String>, Counter>),
    Gauge(DashMap<Vec<String>, Gauge>),
    Histogram {
        bounds: Arc<[f64]>,
        cells: DashMap<Vec<String>, Histogram>,
    },
}

pub(crate) struct Family {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) label_names: Vec<String>,
    pub(crate) series: Series,
}

impl Family {
    pub(crate) fn kind(&self) -> MetricKind {
        match self.series {
            Series::Counter(_) => MetricKind::Counter,
            Series::Gauge(_) => MetricKind::Gauge,
            Series::Histogram { .. } => MetricKind::Histogram,
        }
    }

    fn key(&self, label_values: &[&str]) -> Result<Vec<String>> {
        if label_values.len() != self.label_names.len() {
            return Err(ProbeError::LabelArity {
                name: self.name.clone(),
                expected: self.label_names.len(),
                got: label_values.len(),
            });
        }
        Ok(label_values.iter().map(|v| v.to_string()).collect())
    }

    fn get_or_create(&self, label_values: &[&str]) -> Result<Instrument> {
        let key = self.key(label_values)?;
        let inst = match &self.series {
            Series::Counter(m) => Instrument::Counter(m.entry(key).or_default().clone()),
            Series::Gauge(m) => Instrument::Gauge(m.entry(key).or_default().clone()),
            Series::Histogram { bounds, cells } => Instrument::Histogram(
                cells
                    .entry(key)
                    .or_insert_with(|| Histogram::new(Arc::clone(bounds)))
                    .clone(),
            ),
        };
        Ok(inst)
    }

    fn lookup(&self, label_values: &[&str]) -> Result<Option<Instrument>> {
        let key = self.key(label_values)?;
        let inst = match &self.series {
            Series::Counter(m) => m.get(&key).map(|r| Instrument::Counter(r.value().clone())),
            Series::Gauge(m) => m.get(&key).map(|r| Instrument::Gauge(r.value().clone())),
            Series::Histogram { cells, .. } => cells
                .get(&key)
                .map(|r| Instrument::Histogram(r.value().clone())),
        };
        Ok(inst)
    }
}

/// Owner of every instrument in the process.
///
/// Build one at startup, register the families, then share it behind an `Arc`.
#[derive(Default)]
pub struct Registry {
    by_name: DashMap<String, Arc<Family>>,
    // registration order, for deterministic exposition
    order: RwLock<Vec<Arc<Family>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a family. `buckets` is required for histograms and ignored otherwise.
    pub fn register(
        &self,
        name: &str,
        help: &str,
        kind: MetricKind,
        label_names: &[&str],
        buckets: Option<&[f64]>,
    ) -> Result<()> {
        validate_metric_name(name)?;
        for l in label_names {
            validate_label_name(l)?;
            if kind == MetricKind::Histogram && *l == "le" {
                return Err(ProbeError::InvalidName(format!(
                    "histogram {name} cannot use reserved label `le`"
                )));
            }
        }
        let series = match kind {
            MetricKind::Counter => Series::Counter(DashMap::new()),
            MetricKind::Gauge => Series::Gauge(DashMap::new()),
            MetricKind::Histogram => {
                let b = buckets.ok_or_else(|| {
                    ProbeError::InvalidBuckets(format!("histogram {name} needs bucket bounds"))
                })?;
                validate_buckets(b)?;
                Series::Histogram {
                    bounds: Arc::from(b),
                    cells: DashMap::new(),
                }
            }
        };

        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(_) => Err(ProbeError::DuplicateMetric(name.to_string())),
            Entry::Vacant(slot) => {
                let family = Arc::new(Family {
                    name: name.to_string(),
                    help: help.to_string(),
                    label_names: label_names.iter().map(|l| l.to_string()).collect(),
                    series,
                });
                self.order.write().push(Arc::clone(&family));
                slot.insert(family);
                tracing::debug!(metric = %name, %kind, "metric registered");
                Ok(())
            }
        }
    }

    /// Return the cell for `label_values`, creating it on first use.
    pub fn get(&self, name: &str, label_values: &[&str]) -> Result<Instrument> {
        self.family(name)?.get_or_create(label_values)
    }

    /// Like [`Registry::get`] but never creates a series.
    pub fn lookup(&self, name: &str, label_values: &[&str]) -> Result<Option<Instrument>> {
        self.family(name)?.lookup(label_values)
    }

    pub fn counter(&self, name: &str, label_values: &[&str]) -> Result<Counter> {
        match self.get(name, label_values)? {
            Instrument::Counter(c) => Ok(c),
            other => Err(mismatch(name, MetricKind::Counter, other.kind())),
        }
    }

    pub fn gauge(&self, name: &str, label_values: &[&str]) -> Result<Gauge> {
        match self.get(name, label_values)? {
            Instrument::Gauge(g) => Ok(g),
            other => Err(mismatch(name, MetricKind::Gauge, other.kind())),
        }
    }

    pub fn histogram(&self, name: &str, label_values: &[&str]) -> Result<Histogram> {
        match self.get(name, label_values)? {
            Instrument::Histogram(h) => Ok(h),
            other => Err(mismatch(name, MetricKind::Histogram, other.kind())),
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.by_name.get(name).map(|f| f.kind())
    }

    /// Render every family in Prometheus text format.
    pub fn render(&self) -> String {
        crate::metrics::exposition::render(self)
    }

    pub(crate) fn families(&self) -> Vec<Arc<Family>> {
        self.order.read().clone()
    }

    fn family(&self, name: &str) -> Result<Arc<Family>> {
        self.by_name
            .get(name)
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| ProbeError::UnknownMetric(name.to_string()))
    }
}

fn mismatch(name: &str, expected: MetricKind, actual: MetricKind) -> ProbeError {
    ProbeError::KindMismatch {
        name: name.to_string(),
        expected: expected.as_str(),
        actual: actual.as_str(),
    }
}

fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(ProbeError::InvalidName(format!("metric name `{name}`")))
    }
}

fn validate_label_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if ok && !name.starts_with("__") {
        Ok(())
    } else {
        Err(ProbeError::InvalidName(format!("label name `{name}`")))
    }
}

/// Bounds must be finite and strictly increasing; `+Inf` is always implied.
pub fn validate_buckets(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(ProbeError::InvalidBuckets("at least one bound is required".into()));
    }
    if let Some(b) = bounds.iter().find(|b| !b.is_finite()) {
        return Err(ProbeError::InvalidBuckets(format!("bound {b} is not finite")));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ProbeError::InvalidBuckets("bounds must be strictly increasing".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_grammar() {
        assert!(validate_metric_name("http_requests_total").is_ok());
        assert!(validate_metric_name("ns:sub_total").is_ok());
        assert!(validate_metric_name("9lives").is_err());
        assert!(validate_metric_name("").is_err());
        assert!(validate_label_name("method").is_ok());
        assert!(validate_label_name("__reserved").is_err());
        assert!(validate_label_name("has-dash").is_err());
    }

    #[test]
    fn bucket_rules() {
        assert!(validate_buckets(&[0.1, 0.2]).is_ok());
        assert!(validate_buckets(&[]).is_err());
        assert!(validate_buckets(&[0.2, 0.2]).is_err());
        assert!(validate_buckets(&[0.1, f64::INFINITY]).is_err());
    }
}
