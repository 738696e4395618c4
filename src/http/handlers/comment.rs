use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};

use crate::{
    db::comment::{
        delete::delete_comment,
        get::{get_all_comments, get_comments_for_media},
        post::create_comment,
    },
    errors::{ApiError, AppError},
    http::handlers::reject_body,
    models::Comment,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    pub media_title: Option<String>,
    pub author: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCommentResponse {
    pub success: bool,
}

pub async fn get_all_comments_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = get_all_comments(&state.store).await.map_err(|e| {
        tracing::error!("Error reading comments: {}", e);
        e.to_response()
    })?;

    Ok(Json(comments))
}

pub async fn get_media_comments_handler(
    Path(media_title): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let comments = get_comments_for_media(&media_title, &state.store)
        .await
        .map_err(|e| {
            tracing::error!("Error reading comments for '{}': {}", media_title, e);
            e.to_response()
        })?;

    Ok(Json(comments))
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateCommentPayload>, JsonRejection>,
) -> Result<Json<Comment>, ApiError> {
    let Json(payload) = payload.map_err(reject_body)?;

    let (Some(media_title), Some(author), Some(text)) =
        (payload.media_title, payload.author, payload.text)
    else {
        return Err(AppError::Validation("Missing required fields".into()).to_response());
    };

    match create_comment(&media_title, &author, &text, &state.store).await {
        Ok(comment) => {
            tracing::info!(
                "Comment {} added to '{}' by {}",
                comment.id,
                comment.media_title,
                comment.author
            );
            Ok(Json(comment))
        }
        Err(err) => {
            tracing::error!("Error adding comment: {}", err);
            Err(err.to_response())
        }
    }
}

pub async fn delete_comment_handler(
    Path(comment_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteCommentResponse>, ApiError> {
    delete_comment(&comment_id, &state.store)
        .await
        .map_err(|e| {
            tracing::error!("Error deleting comment {}: {}", comment_id, e);
            e.to_response()
        })?;

    Ok(Json(DeleteCommentResponse { success: true }))
}
