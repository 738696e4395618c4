use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    errors::{ApiError, AppError},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        AppError::Unavailable(e.to_string()).to_response()
    })?;

    Ok(Json(HealthResponse { status: "ok" }))
}
