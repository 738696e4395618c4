use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::{
    errors::{ApiError, AppError},
    http::handlers::reject_body,
    identity::RequestContext,
    models::AggregateStats,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SubmitRatingPayload {
    #[serde(alias = "itemId", alias = "mediaTitle")]
    pub item_id: Option<String>,
    pub rating: Option<i64>,
}

pub async fn submit_rating_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<SubmitRatingPayload>, JsonRejection>,
) -> Result<Json<AggregateStats>, ApiError> {
    let Json(payload) = payload.map_err(reject_body)?;

    let (Some(item_id), Some(rating)) = (payload.item_id, payload.rating) else {
        return Err(AppError::Validation("Missing required fields".into()).to_response());
    };

    let voter_key = state.identity.resolve(&ctx);

    let stats = state
        .ratings
        .submit(&item_id, &voter_key, rating)
        .await
        .map_err(|e| {
            if e.is_storage() {
                tracing::error!("Error saving rating for '{}': {}", item_id, e);
            } else {
                tracing::debug!("Rejected rating for '{}': {}", item_id, e);
            }
            e.to_response()
        })?;

    tracing::info!(
        "Rating {} recorded for '{}' ({} total, avg {})",
        rating,
        item_id.trim(),
        stats.count,
        stats.mean
    );
    Ok(Json(stats))
}

pub async fn get_rating_handler(
    Path(item_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AggregateStats>, ApiError> {
    let stats = state.ratings.query(&item_id).await.map_err(|e| {
        tracing::error!("Error reading ratings for '{}': {}", item_id, e);
        e.to_response()
    })?;

    Ok(Json(stats))
}
