pub mod comment;
pub mod guestbook;
pub mod health;
pub mod rating;

use axum::extract::rejection::JsonRejection;

use crate::errors::{ApiError, AppError};

pub use comment::{
    create_comment_handler, delete_comment_handler, get_all_comments_handler,
    get_media_comments_handler,
};
pub use guestbook::{get_guestbook_handler, sign_guestbook_handler};
pub use health::health_handler;
pub use rating::{get_rating_handler, submit_rating_handler};

/// Malformed or non-JSON bodies are client errors like any other bad input.
pub(crate) fn reject_body(rejection: JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    AppError::Validation("Invalid request body".into()).to_response()
}
