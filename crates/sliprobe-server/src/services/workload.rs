//! Synthetic workload: `/work?latencyMs=<int>&failRatePct=<int>`.
//!
//! Sleeps for `latencyMs`, then fails with probability `failRatePct`/100.
//! Used to push known latency and error ratios through the instrumentation.

use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use sliprobe_core::error::ProbeError;

use crate::app_state::AppState;
use crate::config::WorkloadSection;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct WorkQuery {
    #[serde(rename = "latencyMs")]
    pub latency_ms: Option<i64>,
    #[serde(rename = "failRatePct")]
    pub fail_rate_pct: Option<i64>,
}

/// Parameters after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkParams {
    pub latency_ms: u64,
    pub fail_rate_pct: u8,
}

impl WorkParams {
    pub fn resolve(q: &WorkQuery, defaults: &WorkloadSection) -> Self {
        let latency_ms = q
            .latency_ms
            .map(|v| v.max(0) as u64)
            .unwrap_or(defaults.default_latency_ms);
        let fail_rate_pct = q
            .fail_rate_pct
            .map(|v| v.clamp(0, 100) as u8)
            .unwrap_or(defaults.default_fail_rate_pct.min(100));
        Self {
            latency_ms,
            fail_rate_pct,
        }
    }

    /// `roll` is a uniform draw from `[0, 100)`.
    pub fn fails(&self, roll: u8) -> bool {
        roll < self.fail_rate_pct
    }
}

fn roll() -> u8 {
    rand::thread_rng().gen_range(0..100)
}

pub async fn work(
    State(state): State<AppState>,
    query: Result<Query<WorkQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(q) = query.map_err(|e| ProbeError::BadRequest(e.body_text()))?;
    let params = WorkParams::resolve(&q, &state.cfg().workload);

    tokio::time::sleep(Duration::from_millis(params.latency_ms)).await;

    if params.fails(roll()) {
        return Err(ProbeError::SimulatedFailure.into());
    }

    let body = json!({
        "ok": true,
        "latencyMs": params.latency_ms,
        "failRatePct": params.fail_rate_pct,
    });
    Ok((StatusCode::OK, Json(body)).into_response())
}
