//! Readiness probe.
//!
//! Reports 200 only while the process is `Ready`. During startup and drain it
//! answers 503 with the current state so a load balancer can stop routing
//! before the listener closes. Liveness is unaffected.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::http::server::AppState;
use crate::lifecycle::ProcessState;

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub state: ProcessState,
}

/// `GET /ready`
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let current = state.lifecycle.state();
    let (code, status) = if current == ProcessState::Ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            state: current,
        }),
    )
}
