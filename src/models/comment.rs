use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_AUTHOR_LEN: usize = 50;
pub const MAX_TEXT_LEN: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Opaque; new documents get a UUID v4, older data may carry other formats.
    pub id: String,
    pub media_title: String,
    pub author: String,
    pub text: String,
    #[serde(with = "crate::models::timestamp")]
    pub timestamp: DateTime<Utc>,
}
