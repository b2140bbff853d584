//! sliprobe load generator.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use sliprobe_server::loadgen::{self, LoadPlan};

#[derive(Debug, Parser)]
#[command(name = "sliprobe-loadgen", about = "Drive /work with a fixed latency and failure mix")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    target: String,
    #[arg(long, default_value_t = 200)]
    latency_ms: u64,
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(0..=100))]
    fail_rate_pct: u8,
    /// Concurrent virtual users.
    #[arg(long, default_value_t = 10)]
    vus: usize,
    #[arg(long, default_value_t = 30)]
    duration_secs: u64,
    /// Think time between requests of one user.
    #[arg(long, default_value_t = 100)]
    pause_ms: u64,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let plan = LoadPlan {
        target: args.target,
        latency_ms: args.latency_ms,
        fail_rate_pct: args.fail_rate_pct,
        vus: args.vus,
        duration: Duration::from_secs(args.duration_secs),
        pause: Duration::from_millis(args.pause_ms),
    };

    let tally = loadgen::run(&plan, reqwest::Client::new()).await;
    tracing::info!(
        total = tally.total(),
        server_errors = tally.server_errors(),
        transport_errors = tally.transport_errors,
        error_ratio = tally.error_ratio(),
        "load finished"
    );
    for (status, n) in &tally.by_status {
        tracing::info!(status, count = n, "responses");
    }
}
