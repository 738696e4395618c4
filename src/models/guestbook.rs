use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LEN: usize = 50;
pub const MAX_MESSAGE_LEN: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookEntry {
    /// Opaque; new documents get a UUID v4, older data may carry other formats.
    pub id: String,
    pub name: String,
    pub message: String,
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: DateTime<Utc>,
}
