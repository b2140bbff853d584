//! HTTP mapping for `ProbeError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sliprobe_core::error::{ClientCode, ProbeError};

/// Handler error; renders as a JSON body with a stable `error` code.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ProbeError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.client_code() {
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = self.status();
        let body = match &self.0 {
            // expected outcome of /work, not an anomaly
            ProbeError::SimulatedFailure => {
                tracing::debug!("simulated failure");
                json!({ "ok": false, "error": code.as_str() })
            }
            err => {
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                } else {
                    tracing::debug!(error = %err, "request rejected");
                }
                json!({ "ok": false, "error": code.as_str(), "msg": err.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
