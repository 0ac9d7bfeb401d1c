//! Shared fixtures for the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use auth_route::{
    MemoryStore, Model, Query, RecordStore, Route, RouteBackend, Schema, Shape, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Initializes test logging; safe to call from every test
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Store that fails every lookup, for error-propagation scenarios
pub struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn find_one(&self, _: &str, _: &Query) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".into()))
    }

    async fn find_many(&self, _: &str, _: &Query) -> Result<Vec<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".into()))
    }

    async fn find_by_id(&self, _: &str, _: &Value) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".into()))
    }
}

pub fn user_schema() -> Schema {
    Schema::new()
        .with_field("id", Shape::Scalar)
        .with_field("name", Shape::Scalar)
        .with_field("role", Shape::Scalar)
}

pub fn role_schema() -> Schema {
    Schema::new()
        .with_field("id", Shape::Scalar)
        .with_field("name", Shape::Scalar)
        .with_field("privs", Shape::sequence(Shape::Scalar))
}

/// Credential documents carry a single `user` field
pub fn creds_shape() -> Shape {
    Shape::record(Schema::new().with_field("user", Shape::Scalar))
}

/// Seeds the canonical directory: alice the admin, bob the viewer, and
/// carol whose declared role has no record
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for user in [
        json!({ "name": "alice", "role": "admin" }),
        json!({ "name": "bob", "role": "viewer" }),
        json!({ "name": "carol", "role": "ghost" }),
    ] {
        store.insert("users", user).await.unwrap();
    }
    for role in [
        json!({ "name": "admin", "privs": ["read", "write", "grant"] }),
        json!({ "name": "viewer", "privs": ["read"] }),
    ] {
        store.insert("roles", role).await.unwrap();
    }
    store
}

/// Models over the seeded collections
pub fn models(store: Arc<dyn RecordStore>) -> (Model, Model) {
    (
        Model::new("users", user_schema(), store.clone()),
        Model::new("roles", role_schema(), store),
    )
}

/// The canonical credentials → user → role → privileges wiring
pub fn backend_over(store: Arc<dyn RecordStore>) -> RouteBackend {
    let (users, roles) = models(store);
    RouteBackend::new(
        Route::root(creds_shape())
            .field("user")
            .unwrap()
            .linked_with("name")
            .gives(users.shape()),
        Route::root(users.shape())
            .field("role")
            .unwrap()
            .linked_with("name")
            .gives(roles.shape()),
        Route::root(roles.shape()).field("privs").unwrap(),
    )
}
