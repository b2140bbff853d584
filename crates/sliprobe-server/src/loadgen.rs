//! Closed-loop load generator for `/work`.
//!
//! Each virtual user repeatedly issues one request, waits for the answer,
//! pauses, and goes again until the deadline. Mirrors the k6 scenario used to
//! drive the dashboards: `latencyMs=200`, `failRatePct=5`, 100 ms think time.

use std::collections::BTreeMap;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct LoadPlan {
    /// Base URL of the service, e.g. `http://127.0.0.1:8080`.
    pub target: String,
    pub latency_ms: u64,
    pub fail_rate_pct: u8,
    pub vus: usize,
    pub duration: Duration,
    pub pause: Duration,
}

impl Default for LoadPlan {
    fn default() -> Self {
        Self {
            target: "http://127.0.0.1:8080".into(),
            latency_ms: 200,
            fail_rate_pct: 5,
            vus: 10,
            duration: Duration::from_secs(30),
            pause: Duration::from_millis(100),
        }
    }
}

impl LoadPlan {
    pub fn work_url(&self) -> String {
        format!(
            "{}/work?latencyMs={}&failRatePct={}",
            self.target.trim_end_matches('/'),
            self.latency_ms,
            self.fail_rate_pct
        )
    }
}

/// Client-side outcome counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub by_status: BTreeMap<u16, u64>,
    /// Requests that never produced a status (connect refused, reset, ...).
    pub transport_errors: u64,
}

impl Tally {
    pub fn record(&mut self, status: u16) {
        *self.by_status.entry(status).or_default() += 1;
    }

    pub fn record_transport_error(&mut self) {
        self.transport_errors += 1;
    }

    pub fn merge(&mut self, other: Tally) {
        for (status, n) in other.by_status {
            *self.by_status.entry(status).or_default() += n;
        }
        self.transport_errors += other.transport_errors;
    }

    pub fn total(&self) -> u64 {
        self.by_status.values().sum::<u64>() + self.transport_errors
    }

    pub fn server_errors(&self) -> u64 {
        self.by_status
            .iter()
            .filter(|(s, _)| (500..600).contains(*s))
            .map(|(_, n)| n)
            .sum()
    }

    /// Share of requests that were 5xx or never got a response.
    pub fn error_ratio(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.server_errors() + self.transport_errors) as f64 / total as f64,
        }
    }
}

async fn virtual_user(client: reqwest::Client, url: String, deadline: Instant, pause: Duration) -> Tally {
    let mut tally = Tally::default();
    while Instant::now() < deadline {
        match client.get(&url).send().await {
            Ok(resp) => tally.record(resp.status().as_u16()),
            Err(e) => {
                tracing::debug!(error = %e, "request failed");
                tally.record_transport_error();
            }
        }
        tokio::time::sleep(pause).await;
    }
    tally
}

/// Run `plan` to completion. In-flight requests at the deadline are awaited.
pub async fn run(plan: &LoadPlan, client: reqwest::Client) -> Tally {
    let url = plan.work_url();
    let deadline = Instant::now() + plan.duration;
    tracing::info!(%url, vus = plan.vus, duration = ?plan.duration, "load started");

    let users = (0..plan.vus.max(1))
        .map(|_| virtual_user(client.clone(), url.clone(), deadline, plan.pause));

    let mut tally = Tally::default();
    for t in join_all(users).await {
        tally.merge(t);
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_matches_scenario() {
        let plan = LoadPlan {
            target: "http://app:8080/".into(),
            ..LoadPlan::default()
        };
        assert_eq!(plan.work_url(), "http://app:8080/work?latencyMs=200&failRatePct=5");
    }

    #[test]
    fn tally_ratio() {
        let mut a = Tally::default();
        a.record(200);
        a.record(200);
        a.record(500);
        let mut b = Tally::default();
        b.record(503);
        b.record_transport_error();
        a.merge(b);
        assert_eq!(a.total(), 5);
        assert_eq!(a.server_errors(), 2);
        assert!((a.error_ratio() - 0.6).abs() < 1e-9);
        assert_eq!(Tally::default().error_ratio(), 0.0);
    }
}
