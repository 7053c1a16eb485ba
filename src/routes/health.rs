//! Probe endpoints for container orchestration.
//!
//! - `/live`: liveness, always 200 while the process can answer HTTP.
//! - `/ready`: readiness, 503 until the startup delay has passed.
//! - `/health`: general health for load balancers and manual checks.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

/// Body shared by all probe responses.
#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    pub status: &'static str,
}

/// Liveness probe handler.
pub async fn live() -> Json<ProbeStatus> {
    Json(ProbeStatus { status: "alive" })
}

/// Readiness probe handler.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ProbeStatus>) {
    if state.readiness.is_ready() {
        (StatusCode::OK, Json(ProbeStatus { status: "ready" }))
    } else {
        tracing::info!("Readiness probe: not ready yet");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeStatus {
                status: "not ready",
            }),
        )
    }
}

/// Health check handler.
pub async fn health() -> Json<ProbeStatus> {
    Json(ProbeStatus { status: "ok" })
}
