use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// One voter's star rating for one item. Unique per (item_id, voter_key).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub item_id: String,
    pub voter_key: String,
    pub value: u8,
    #[serde(with = "crate::models::timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// Derived over the current ratings of a single item, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    #[serde(rename = "total")]
    pub count: u64,
    pub sum: u64,
    #[serde(rename = "average")]
    pub mean: f64,
}

impl AggregateStats {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let (count, sum) = values
            .into_iter()
            .fold((0u64, 0u64), |(count, sum), v| (count + 1, sum + u64::from(v)));

        let mean = if count > 0 {
            round_one_decimal(sum as f64 / count as f64)
        } else {
            0.0
        };

        Self { count, sum, mean }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn validate_rating(value: i64) -> Result<u8, AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(AppError::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }

    Ok(value as u8)
}
