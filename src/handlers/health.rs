use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;

use crate::models::{api_error, ApiError, HealthResponse};
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint; ready once the dispatcher answers
pub async fn ready_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    debug!("Readiness check requested");
    match state.dispatcher.stats().await {
        Some(_) => Ok(Json(HealthResponse {
            status: "ok".to_string(),
            message: "Service is ready".to_string(),
        })),
        None => Err(api_error(StatusCode::SERVICE_UNAVAILABLE, "Collaboration dispatcher is not running")),
    }
}
