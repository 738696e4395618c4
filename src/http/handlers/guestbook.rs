use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::{
    db::guestbook::{get::get_guestbook_entries, post::sign_guestbook},
    errors::{ApiError, AppError},
    http::handlers::reject_body,
    models::GuestbookEntry,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignGuestbookPayload {
    pub name: Option<String>,
    pub message: Option<String>,
}

pub async fn get_guestbook_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GuestbookEntry>>, ApiError> {
    let entries = get_guestbook_entries(&state.store).await.map_err(|e| {
        tracing::error!("Error reading guestbook: {}", e);
        e.to_response()
    })?;

    Ok(Json(entries))
}

pub async fn sign_guestbook_handler(
    State(state): State<AppState>,
    payload: Result<Json<SignGuestbookPayload>, JsonRejection>,
) -> Result<Json<GuestbookEntry>, ApiError> {
    let Json(payload) = payload.map_err(reject_body)?;

    let (Some(name), Some(message)) = (payload.name, payload.message) else {
        return Err(AppError::Validation("Missing required fields".into()).to_response());
    };

    let entry = sign_guestbook(&name, &message, &state.store)
        .await
        .map_err(|e| {
            tracing::error!("Error signing guestbook: {}", e);
            e.to_response()
        })?;

    tracing::info!("Guestbook signed by {}", entry.name);
    Ok(Json(entry))
}
