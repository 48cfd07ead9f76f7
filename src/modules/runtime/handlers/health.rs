//! Liveness and readiness handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portfolio_types::HealthResponse;
use tracing::warn;

use crate::state::AppState;

/// Handler for `/` and `/health`
pub struct HealthHandler;

impl HealthHandler {
    /// Handle GET /
    pub async fn liveness() -> &'static str {
        "Portfolio Server Running"
    }

    /// Handle GET /health: pings the store
    pub async fn health(State(state): State<AppState>) -> Response {
        match state.store.health_check().await {
            Ok(store) => (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ok".to_string(),
                    store: store.to_string(),
                    error: None,
                }),
            )
                .into_response(),
            Err(e) => {
                warn!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse {
                        status: "unavailable".to_string(),
                        store: state.store.status().to_string(),
                        error: Some(e.sanitized_message()),
                    }),
                )
                    .into_response()
            }
        }
    }
}
