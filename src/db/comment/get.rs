use crate::{
    db::{
        comment::COMMENTS,
        store::{Filter, Sort, Store, from_document},
    },
    errors::AppError,
    models::Comment,
};

/// Oldest first.
pub async fn get_all_comments(store: &Store) -> Result<Vec<Comment>, AppError> {
    load_comments(Filter::all(), store).await
}

pub async fn get_comments_for_media(
    media_title: &str,
    store: &Store,
) -> Result<Vec<Comment>, AppError> {
    load_comments(Filter::all().eq("mediaTitle", media_title.trim()), store).await
}

async fn load_comments(filter: Filter, store: &Store) -> Result<Vec<Comment>, AppError> {
    let documents = store
        .find_many(COMMENTS, &filter, Some(&Sort::asc("timestamp")))
        .await?;

    documents.into_iter().map(from_document::<Comment>).collect()
}
