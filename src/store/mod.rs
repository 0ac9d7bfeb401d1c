//! Collection lookup boundary
//!
//! The engine's sole external dependency: something able to answer equality
//! queries and identifier lookups against named collections of JSON records.
//! Implementations wrap whatever backend actually holds the records; the
//! bundled [`MemoryStore`] keeps them in process memory and is what the test
//! suites run against.
//!
//! Store errors are never retried or remapped by the engine; they surface
//! verbatim to the caller of the resolution that triggered the lookup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;

/// Store-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not execute the query
    #[error("store query failed: {0}")]
    Query(String),

    /// The backend is unreachable or timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Equality query over named top-level fields
///
/// Terms are ANDed: a record matches when every named field holds exactly
/// the queried value. Nested matching is deliberately out of scope; route
/// chains project nested values *before* querying, so the store only ever
/// sees flat equality.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    terms: BTreeMap<String, Value>,
}

impl Query {
    /// Empty query, matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-term equality query
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new().and_eq(field, value)
    }

    /// Add another equality term
    pub fn and_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.terms.insert(field.into(), value);
        self
    }

    /// Iterate the query terms in field order
    pub fn terms(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.terms.iter().map(|(field, value)| (field.as_str(), value))
    }

    /// Returns true when the query has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether `record` satisfies every term
    pub fn matches(&self, record: &Value) -> bool {
        self.terms
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// The collection lookup capability the engine is built against
///
/// All three operations are asynchronous and may fail with a [`StoreError`];
/// cancellation and timeout policy belong to the implementation, not to the
/// engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// First record matching `query`, or `None`
    async fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Value>, StoreError>;

    /// All records matching `query` (possibly empty)
    async fn find_many(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// The record whose primary identifier equals `id`, or `None`
    async fn find_by_id(&self, collection: &str, id: &Value) -> Result<Option<Value>, StoreError>;
}
