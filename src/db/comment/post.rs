use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{
        comment::COMMENTS,
        store::{Store, to_document},
    },
    errors::AppError,
    models::{
        Comment,
        comment::{MAX_AUTHOR_LEN, MAX_TEXT_LEN},
    },
};

pub async fn create_comment(
    media_title: &str,
    author: &str,
    text: &str,
    store: &Store,
) -> Result<Comment, AppError> {
    let (media_title, author, text) = (media_title.trim(), author.trim(), text.trim());

    if media_title.is_empty() || author.is_empty() || text.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }

    if author.chars().count() > MAX_AUTHOR_LEN || text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation("Comment too long".into()));
    }

    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        media_title: media_title.to_string(),
        author: author.to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
    };

    store.insert_one(COMMENTS, to_document(&comment)?).await?;

    tracing::debug!("Stored comment {} on '{}'", comment.id, comment.media_title);
    Ok(comment)
}
