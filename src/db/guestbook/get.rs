use crate::{
    db::{
        guestbook::GUESTBOOK,
        store::{Filter, Sort, Store, from_document},
    },
    errors::AppError,
    models::GuestbookEntry,
};

/// Newest first.
pub async fn get_guestbook_entries(store: &Store) -> Result<Vec<GuestbookEntry>, AppError> {
    let documents = store
        .find_many(GUESTBOOK, &Filter::all(), Some(&Sort::desc("timestamp")))
        .await?;

    documents
        .into_iter()
        .map(from_document::<GuestbookEntry>)
        .collect()
}
