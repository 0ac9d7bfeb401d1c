//! # Auth Route
//!
//! Role-based access control decisions on a declarative field-routing and
//! resolution engine.
//!
//! Routes are composable pipelines declared once at configuration time and
//! evaluated asynchronously per input: project a field, follow a relation
//! into a record store, memoize an intermediate value, assert a predicate.
//! Absence (a missing field, an unmatched lookup, a failed assertion) is a
//! first-class successful outcome, `Ok(None)`, never an error.
//!
//! ## Features
//!
//! - **Composable route chains** built once, shared across concurrent
//!   resolutions
//! - **Async-first design** using the Tokio runtime
//! - **Pluggable record stores** behind the [`RecordStore`] trait, with a
//!   bundled in-memory implementation
//! - **Construction-time shape introspection** for field paths and
//!   relation targets
//! - **Per-resolution scratchpad** for memoizing values across hops
//! - **RBAC adapter** binding three routes to a pluggable
//!   [`AuthBackend`] contract
//!
//! ## Example
//!
//! ```rust
//! use auth_route::{AuthBackend, MemoryStore, Model, Route, RouteBackend, Schema, Shape};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     store
//!         .insert("users", json!({ "name": "alice", "role": "admin" }))
//!         .await?;
//!     store
//!         .insert("roles", json!({ "name": "admin", "privs": ["read", "write"] }))
//!         .await?;
//!
//!     let users = Model::new(
//!         "users",
//!         Schema::new()
//!             .with_field("name", Shape::Scalar)
//!             .with_field("role", Shape::Scalar),
//!         store.clone(),
//!     );
//!     let roles = Model::new(
//!         "roles",
//!         Schema::new()
//!             .with_field("name", Shape::Scalar)
//!             .with_field("privs", Shape::sequence(Shape::Scalar)),
//!         store.clone(),
//!     );
//!
//!     let creds = Shape::record(Schema::new().with_field("user", Shape::Scalar));
//!     let backend = RouteBackend::new(
//!         Route::root(creds)
//!             .field("user")?
//!             .linked_with("name")
//!             .gives(users.shape()),
//!         Route::root(users.shape())
//!             .field("role")?
//!             .linked_with("name")
//!             .gives(roles.shape()),
//!         Route::root(roles.shape()).field("privs")?,
//!     );
//!
//!     let user = backend.authenticate_user(json!({ "user": "alice" })).await?;
//!     let role = backend.user_get_role(user.unwrap()).await?;
//!     assert!(backend.role_has_privilege(role.unwrap(), &json!("write")).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod path;
pub mod rbac;
pub mod route;
pub mod shape;
pub mod store;

// Re-export commonly used types
pub use error::{Result, RouteError};
pub use path::{FieldPath, PathError, Segment};
pub use rbac::{AuthBackend, RouteBackend};
pub use route::{Route, Scratchpad};
pub use shape::{Model, Schema, Shape};
pub use store::{Query, RecordStore, StoreError};

#[cfg(feature = "memory")]
pub use store::MemoryStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
