//! sliprobe server
//!
//! - `/work`    : synthetic latency + failure injection
//! - `/healthz` : liveness
//! - `/metrics` : Prometheus exposition (not self-instrumented)

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use sliprobe_core::error::{ProbeError, Result};
use sliprobe_server::{app_state::AppState, config, router};

#[derive(Debug, Parser)]
#[command(name = "sliprobe", about = "Synthetic workload service for SLI validation")]
struct Args {
    /// YAML config file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "fatal sliprobe error");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let cfg = config::load(args.config.as_deref())?;
    let listen = cfg.server.listen_addr()?;

    // metric registration happens here; a clash aborts before binding
    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "sliprobe starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| ProbeError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProbeError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
