//! Service config loader (strict parsing).
//!
//! Every field has a default, so running without a file reproduces the
//! reference service: `0.0.0.0:8080`, `latencyMs=100`, `failRatePct=0`.

pub mod schema;

use std::fs;

use sliprobe_core::error::{ProbeError, Result};

pub use schema::{MetricsSection, ProbeConfig, ServerSection, WorkloadSection};

pub fn load_from_file(path: &str) -> Result<ProbeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ProbeError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ProbeConfig> {
    let cfg: ProbeConfig = serde_yaml::from_str(s)
        .map_err(|e| ProbeError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when given, otherwise fall back to built-in defaults.
pub fn load(path: Option<&str>) -> Result<ProbeConfig> {
    match path {
        Some(p) => load_from_file(p),
        None => {
            let cfg = ProbeConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
