use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::{state::AppState, types::HealthResponse};

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                redis: "connected".to_string(),
            }),
        ),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    redis: "disconnected".to_string(),
                }),
            )
        }
    }
}
