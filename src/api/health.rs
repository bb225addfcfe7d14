use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Liveness payload polled by the orchestrator
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// GET /health - Liveness probe
///
/// Only proves the process can answer HTTP. It stays fast even while other
/// requests are burning CPU on a different worker.
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}
