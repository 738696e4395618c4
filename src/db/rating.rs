use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::store::{Document, Filter, Store, UpsertOutcome, from_document},
    errors::AppError,
    models::{
        rating::{AggregateStats, Rating, validate_rating},
        timestamp,
    },
};

pub const RATINGS: &str = "ratings";

/// One vote per (item, voter), plus the running stats over an item's votes.
///
/// Stats returned by `submit` are recomputed after the upsert but are not
/// isolated from concurrent votes by other voters on the same item; the next
/// `query` reflects every committed vote.
#[derive(Clone)]
pub struct RatingAggregator {
    store: Store,
}

impl RatingAggregator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        item_id: &str,
        voter_key: &str,
        value: i64,
    ) -> Result<AggregateStats, AppError> {
        let item_id = item_id.trim();
        if item_id.is_empty() {
            return Err(AppError::Validation("Missing item id".into()));
        }
        if voter_key.is_empty() {
            return Err(AppError::Validation("Missing voter key".into()));
        }
        let value = validate_rating(value)?;

        let filter = Filter::all()
            .eq("itemId", item_id)
            .eq("voterKey", voter_key);

        let mut set = Document::new();
        set.insert("value".into(), Value::from(value));
        set.insert(
            "recordedAt".into(),
            Value::String(timestamp::format(&Utc::now())),
        );

        let mut set_on_insert = Document::new();
        set_on_insert.insert("id".into(), Value::String(Uuid::new_v4().to_string()));

        let outcome = self
            .store
            .upsert_one(RATINGS, &filter, set, set_on_insert)
            .await?;

        match &outcome {
            UpsertOutcome::Inserted(id) => {
                tracing::debug!("New rating {} for '{}' by {}", id, item_id, voter_key)
            }
            UpsertOutcome::Updated(id) => {
                tracing::debug!("Rating {} for '{}' overwritten by {}", id, item_id, voter_key)
            }
        }

        self.query(item_id).await
    }

    pub async fn query(&self, item_id: &str) -> Result<AggregateStats, AppError> {
        let ratings = self.ratings_for(item_id).await?;
        Ok(AggregateStats::from_values(ratings.iter().map(|r| r.value)))
    }

    pub async fn ratings_for(&self, item_id: &str) -> Result<Vec<Rating>, AppError> {
        let filter = Filter::all().eq("itemId", item_id.trim());

        self.store
            .find_many(RATINGS, &filter, None)
            .await?
            .into_iter()
            .map(from_document::<Rating>)
            .collect()
    }
}
