//! Health and readiness endpoints.

use axum::Json;
use serde::Serialize;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
}

/// Liveness: the process is up.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Readiness: the process is wired and accepting work.
///
/// Store reachability is probed per request by the operations
/// themselves; readiness only reports that the router is live.
pub async fn readiness_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
