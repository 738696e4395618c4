use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{
        guestbook::GUESTBOOK,
        store::{Store, to_document},
    },
    errors::AppError,
    models::{
        GuestbookEntry,
        guestbook::{MAX_MESSAGE_LEN, MAX_NAME_LEN},
    },
};

pub async fn sign_guestbook(
    name: &str,
    message: &str,
    store: &Store,
) -> Result<GuestbookEntry, AppError> {
    let (name, message) = (name.trim(), message.trim());

    if name.is_empty() || message.is_empty() {
        return Err(AppError::Validation("Missing required fields".into()));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }

    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }

    let entry = GuestbookEntry {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        message: message.to_string(),
        timestamp: Utc::now(),
    };

    store.insert_one(GUESTBOOK, to_document(&entry)?).await?;

    tracing::debug!("Guestbook signed by {}", entry.name);
    Ok(entry)
}
