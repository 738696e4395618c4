use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::AppError;

pub const ID_FIELD: &str = "id";

pub type Document = Map<String, Value>;

pub type Store = Arc<dyn DocumentStore>;

/// Minimal capability set every backend provides.
///
/// `upsert_one` must be atomic with respect to other calls on the same
/// collection; everything else only needs single-document atomicity.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Readiness check, fails when the backend cannot serve requests.
    async fn ping(&self) -> Result<(), AppError>;

    async fn find_one(&self, collection: &str, filter: &Filter)
    -> Result<Option<Document>, AppError>;

    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Document>, AppError>;

    /// Inserts `document`, assigning a fresh `id` when it has none. Returns the id.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String, AppError>;

    /// Merges `patch` into the first matching document. Returns whether one matched.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        patch: Document,
    ) -> Result<bool, AppError>;

    /// Applies `set` to the first matching document, or inserts a new one built from
    /// the filter fields, then `set_on_insert`, then `set`, later ones overwriting.
    async fn upsert_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        set_on_insert: Document,
    ) -> Result<UpsertOutcome, AppError>;

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<bool, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => id,
        }
    }
}

/// Conjunction of field equalities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self::all().eq(ID_FIELD, id)
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    pub fn to_document(&self) -> Document {
        self.fields.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }

    /// Stable; documents missing the field sort first in ascending order.
    pub fn apply(&self, documents: &mut [Document]) {
        documents.sort_by(|a, b| {
            let ordering = compare_values(a.get(&self.field), b.get(&self.field));
            match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Returns the document's id, generating a UUID v4 one if missing.
pub fn ensure_id(document: &mut Document) -> String {
    match document.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => {
            let id = Uuid::new_v4().to_string();
            document.insert(ID_FIELD.into(), Value::String(id.clone()));
            id
        }
    }
}

/// Field-by-field overwrite of `target` with `patch`.
pub fn merge(target: &mut Document, patch: Document) {
    for (field, value) in patch {
        target.insert(field, value);
    }
}

/// Builds the document an upsert inserts when nothing matched.
pub fn upsert_document(filter: &Filter, set: Document, set_on_insert: Document) -> Document {
    let mut document = filter.to_document();
    merge(&mut document, set_on_insert);
    merge(&mut document, set);
    document
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document, AppError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Serialization(format!(
            "Expected a JSON object, got {other}"
        ))),
        Err(e) => Err(AppError::Serialization(e.to_string())),
    }
}

pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(document))
        .map_err(|e| AppError::Deserialization(e.to_string()))
}
