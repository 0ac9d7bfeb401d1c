//! In-memory record store
//!
//! Collections are lists of JSON documents behind an async `RwLock`; queries
//! are linear scans. Intended for tests and small embedded directories, not
//! as a serious storage engine.

use super::{Query, RecordStore, StoreError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Primary-identifier field used unless overridden
const DEFAULT_ID_FIELD: &str = "id";

/// In-memory [`RecordStore`] implementation
///
/// Documents must be JSON objects. [`MemoryStore::insert`] assigns a fresh
/// uuid to documents that arrive without a primary identifier, and returns
/// the document as stored so callers can pick the identifier up.
pub struct MemoryStore {
    id_field: String,
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create a store whose primary identifier field is `"id"`
    pub fn new() -> Self {
        Self::with_id_field(DEFAULT_ID_FIELD)
    }

    /// Create a store with a different primary identifier field
    /// (e.g. `"_id"` for Mongo-shaped fixtures)
    pub fn with_id_field(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// The primary identifier field this store matches `find_by_id` against
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Insert a document, assigning a fresh identifier when missing
    ///
    /// Returns the document as stored.
    ///
    /// # Errors
    ///
    /// Rejects values that are not JSON objects.
    pub async fn insert(&self, collection: &str, document: Value) -> Result<Value, StoreError> {
        let mut document = document;
        match &mut document {
            Value::Object(fields) => {
                fields
                    .entry(self.id_field.clone())
                    .or_insert_with(|| json!(Uuid::new_v4().to_string()));
            }
            other => {
                return Err(StoreError::Query(format!(
                    "only JSON objects can be stored, got {}",
                    kind_of(other)
                )));
            }
        }

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());

        Ok(document)
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, Vec::len)
    }

    /// Drop every collection
    pub async fn clear(&self) {
        let mut collections = self.collections.write().await;
        collections.clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| query.matches(d)).cloned()))
    }

    async fn find_many(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| query.matches(d))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &Value) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|d| d.get(&self.id_field) == Some(id))
                .cloned()
        }))
    }
}
