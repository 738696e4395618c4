use axum::{Json, http::StatusCode};
use redis::RedisError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Redis pool error: {0}")]
    RedisPoolError(String),

    #[error("Redis command error: {0}")]
    RedisCommandError(#[from] RedisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Env error: {0}")]
    EnvError(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

impl AppError {
    /// Storage-side failures surface as an opaque 500, the detail only goes to the log.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Storage(_)
                | AppError::RedisPoolError(_)
                | AppError::RedisCommandError(_)
                | AppError::Io(_)
                | AppError::Serialization(_)
                | AppError::Deserialization(_)
        )
    }

    pub fn to_response(&self) -> ApiError {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Storage is not ready".into(),
            ),
            AppError::EnvError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server misconfigured".into(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        };

        (status, Json(ErrorBody { error: message }))
    }
}

impl From<bb8::RunError<RedisError>> for AppError {
    fn from(e: bb8::RunError<RedisError>) -> Self {
        match e {
            bb8::RunError::User(err) => AppError::RedisCommandError(err),
            bb8::RunError::TimedOut => {
                AppError::RedisPoolError("Redis connection timed out".into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request_with_message() {
        let (status, Json(body)) = AppError::Validation("Rating must be 1-5".into()).to_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Rating must be 1-5");
    }

    #[test]
    fn storage_errors_are_opaque() {
        let err = AppError::Storage("disk on fire at /var/data".into());
        assert!(err.is_storage());

        let (status, Json(body)) = err.to_response();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("/var/data"));
    }

    #[test]
    fn not_found_is_not_a_storage_error() {
        let err = AppError::NotFound("Comment abc not found".into());
        assert!(!err.is_storage());
        assert_eq!(err.to_response().0, StatusCode::NOT_FOUND);
    }
}
