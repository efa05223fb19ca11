//! Health check endpoint handlers.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: BackendHealth,
}

/// State of the inventory backend as last observed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendHealth {
    pub demo_mode: bool,
    pub scope: String,
    /// Message of the last failed load or write, cleared by a good refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Simple status response for liveness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Reports `degraded` while the last backend call failed; the process
/// keeps serving its local state either way.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let last_error = state.sync.last_error().await;
    Json(HealthResponse {
        status: if last_error.is_none() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: BackendHealth {
            demo_mode: state.backends.inventory.is_demo(),
            scope: state.scope.school_code().unwrap_or("admin").to_string(),
            last_error,
        },
    })
}

/// Liveness probe endpoint.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}
