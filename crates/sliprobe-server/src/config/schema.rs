use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use sliprobe_core::error::{ProbeError, Result};
use sliprobe_core::metrics::registry::validate_buckets;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub workload: WorkloadSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            workload: WorkloadSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ProbeError::UnsupportedVersion);
        }
        self.server.validate()?;
        self.workload.validate()?;
        self.metrics.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Instrumented requests running longer than this are answered with 408.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(1000..=600000).contains(&self.request_timeout_ms) {
            return Err(ProbeError::BadRequest(
                "server.request_timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            ProbeError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_request_timeout_ms() -> u64 {
    60000
}

/// Defaults applied when `/work` is called without query parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSection {
    #[serde(default = "default_latency_ms")]
    pub default_latency_ms: u64,

    #[serde(default)]
    pub default_fail_rate_pct: u8,
}

impl Default for WorkloadSection {
    fn default() -> Self {
        Self {
            default_latency_ms: default_latency_ms(),
            default_fail_rate_pct: 0,
        }
    }
}

impl WorkloadSection {
    pub fn validate(&self) -> Result<()> {
        if self.default_fail_rate_pct > 100 {
            return Err(ProbeError::BadRequest(
                "workload.default_fail_rate_pct must be between 0 and 100".into(),
            ));
        }
        Ok(())
    }
}

fn default_latency_ms() -> u64 {
    100
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Upper bounds (seconds) of `http_request_duration_seconds`.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            latency_buckets: default_latency_buckets(),
        }
    }
}

impl MetricsSection {
    pub fn validate(&self) -> Result<()> {
        validate_buckets(&self.latency_buckets)
    }
}

// sub-10ms up to multi-second tails
fn default_latency_buckets() -> Vec<f64> {
    vec![
        0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 2.0, 5.0, 10.0,
    ]
}
