//! Axum router wiring.
//!
//! `/healthz` and `/work` sit behind the instrumentation layer; `/metrics`
//! and the 404 fallback do not.

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{app_state::AppState, obs, ops, services};

pub fn build_router(state: AppState) -> Router {
    let app = Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/work", get(services::work));

    instrument(
        app,
        state.http_metrics().clone(),
        state.cfg().server.request_timeout(),
    )
    .route("/metrics", get(ops::metrics))
    .fallback(ops::not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Wrap every route already on `router` with request accounting.
///
/// Panics become 500 and overruns become 408 *inside* the accounting, so the
/// recorded status is the one the client sees. Routes added afterwards are
/// not instrumented.
pub fn instrument<S>(router: Router<S>, metrics: obs::HttpMetrics, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(metrics, obs::track))
}
