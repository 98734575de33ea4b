use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;

use crate::presentation::state::AppState;

/// Reports queue store reachability and depth. Says nothing about whether a
/// worker is consuming.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub queue_depth: Option<usize>,
    pub timestamp: String,
}

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = Utc::now().to_rfc3339();
    match state.producer.queue_depth().await {
        Ok(depth) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                queue_depth: Some(depth),
                timestamp,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach queue store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy".to_string(),
                    queue_depth: None,
                    timestamp,
                }),
            )
        }
    }
}
