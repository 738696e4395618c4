use crate::{
    db::{
        comment::COMMENTS,
        store::{Filter, Store},
    },
    errors::AppError,
};

pub async fn delete_comment(comment_id: &str, store: &Store) -> Result<(), AppError> {
    let deleted = store
        .delete_one(COMMENTS, &Filter::by_id(comment_id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound(format!(
            "Comment {} not found",
            comment_id
        )));
    }

    tracing::info!("Deleted comment {}", comment_id);
    Ok(())
}
