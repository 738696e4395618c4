use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    db::store::{
        Document, DocumentStore, Filter, Sort, UpsertOutcome, ensure_id, merge, upsert_document,
    },
    errors::AppError,
};

/// Collections kept as JSON arrays, one `<collection>.json` file each, or only in memory.
///
/// Every operation holds the same lock for its whole read-modify-write cycle,
/// which is what makes `upsert_one` atomic here.
pub struct JsonStore {
    backing: Mutex<Backing>,
}

enum Backing {
    Memory(HashMap<String, Vec<Document>>),
    Dir(PathBuf),
}

impl JsonStore {
    pub fn in_memory() -> Self {
        Self {
            backing: Mutex::new(Backing::Memory(HashMap::new())),
        }
    }

    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        tracing::info!("JSON store using {}", data_dir.display());
        Ok(Self {
            backing: Mutex::new(Backing::Dir(data_dir)),
        })
    }
}

impl Backing {
    async fn load(&self, collection: &str) -> Result<Vec<Document>, AppError> {
        match self {
            Backing::Memory(collections) => {
                Ok(collections.get(collection).cloned().unwrap_or_default())
            }
            Backing::Dir(dir) => {
                let path = collection_path(dir, collection)?;
                let raw = match tokio::fs::read_to_string(&path).await {
                    Ok(raw) => raw,
                    Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
                    Err(e) => return Err(e.into()),
                };

                if raw.trim().is_empty() {
                    return Ok(Vec::new());
                }

                serde_json::from_str(&raw).map_err(|e| {
                    AppError::Deserialization(format!("{} is corrupt: {}", path.display(), e))
                })
            }
        }
    }

    async fn save(&mut self, collection: &str, documents: Vec<Document>) -> Result<(), AppError> {
        match self {
            Backing::Memory(collections) => {
                collections.insert(collection.to_string(), documents);
                Ok(())
            }
            Backing::Dir(dir) => {
                let path = collection_path(dir, collection)?;
                let tmp = path.with_extension("json.tmp");
                let json = serde_json::to_string_pretty(&documents)
                    .map_err(|e| AppError::Serialization(e.to_string()))?;

                tokio::fs::write(&tmp, json).await?;
                tokio::fs::rename(&tmp, &path).await?;

                tracing::debug!("Wrote {} documents to {}", documents.len(), path.display());
                Ok(())
            }
        }
    }
}

fn collection_path(dir: &Path, collection: &str) -> Result<PathBuf, AppError> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if !valid {
        return Err(AppError::Storage(format!(
            "Invalid collection name '{collection}'"
        )));
    }

    Ok(dir.join(format!("{collection}.json")))
}

#[async_trait]
impl DocumentStore for JsonStore {
    async fn ping(&self) -> Result<(), AppError> {
        let backing = self.backing.lock().await;
        if let Backing::Dir(dir) = &*backing {
            let meta = tokio::fs::metadata(dir).await?;
            if !meta.is_dir() {
                return Err(AppError::Unavailable(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, AppError> {
        let backing = self.backing.lock().await;
        let documents = backing.load(collection).await?;
        Ok(documents.into_iter().find(|d| filter.matches(d)))
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Document>, AppError> {
        let backing = self.backing.lock().await;
        let mut documents: Vec<Document> = backing
            .load(collection)
            .await?
            .into_iter()
            .filter(|d| filter.matches(d))
            .collect();

        if let Some(sort) = sort {
            sort.apply(&mut documents);
        }
        Ok(documents)
    }

    async fn insert_one(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, AppError> {
        let mut backing = self.backing.lock().await;
        let mut documents = backing.load(collection).await?;

        let id = ensure_id(&mut document);
        documents.push(document);
        backing.save(collection, documents).await?;

        Ok(id)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<bool, AppError> {
        let mut backing = self.backing.lock().await;
        let mut documents = backing.load(collection).await?;

        let Some(target) = documents.iter_mut().find(|d| filter.matches(d)) else {
            return Ok(false);
        };
        merge(target, patch);
        backing.save(collection, documents).await?;

        Ok(true)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        set_on_insert: Document,
    ) -> Result<UpsertOutcome, AppError> {
        let mut backing = self.backing.lock().await;
        let mut documents = backing.load(collection).await?;

        let outcome = match documents.iter_mut().find(|d| filter.matches(d)) {
            Some(existing) => {
                merge(existing, set);
                UpsertOutcome::Updated(ensure_id(existing))
            }
            None => {
                let mut document = upsert_document(filter, set, set_on_insert);
                let id = ensure_id(&mut document);
                documents.push(document);
                UpsertOutcome::Inserted(id)
            }
        };

        backing.save(collection, documents).await?;
        Ok(outcome)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, AppError> {
        let mut backing = self.backing.lock().await;
        let mut documents = backing.load(collection).await?;

        let Some(index) = documents.iter().position(|d| filter.matches(d)) else {
            return Ok(false);
        };
        documents.remove(index);
        backing.save(collection, documents).await?;

        Ok(true)
    }
}
