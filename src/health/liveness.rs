//! Liveness probe.
//!
//! Answers 200 whenever the process can serve HTTP. It does not touch the
//! backend or any shared state, so concurrent probes cannot interfere.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
