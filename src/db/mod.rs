pub mod comment;
pub mod guestbook;
pub mod json_store;
pub mod rating;
pub mod redis_store;
pub mod store;

use std::sync::Arc;

pub use json_store::JsonStore;
pub use rating::RatingAggregator;
pub use redis_store::RedisStore;
pub use store::{DocumentStore, Store};

use crate::{config::StorageConfig, errors::AppError};

/// Opens the configured backend and checks it answers before handing it out.
pub async fn connect(config: &StorageConfig) -> Result<Store, AppError> {
    let store: Store = match config {
        StorageConfig::Memory => {
            tracing::warn!("Using in-memory storage, nothing will be persisted");
            Arc::new(JsonStore::in_memory())
        }
        StorageConfig::JsonFile { data_dir } => Arc::new(JsonStore::open(data_dir).await?),
        StorageConfig::Redis { url, key_prefix } => {
            Arc::new(RedisStore::connect(url, key_prefix).await?)
        }
    };

    store.ping().await?;
    Ok(store)
}
