//! Error types for route construction and evaluation
//!
//! Absence is never an error here: missing fields, unmatched relations, and
//! failed assertions all resolve to `Ok(None)`. Errors are reserved for
//! store failures, construction-time misuse, and predicate escape hatches.

use crate::path::PathError;
use crate::store::StoreError;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, RouteError>;

/// Failure during route construction or evaluation
#[derive(Debug, Error)]
pub enum RouteError {
    /// The backing store failed; surfaced to the caller unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A field path did not parse
    #[error("invalid field path: {0}")]
    Path(#[from] PathError),

    /// A relation lookup was built without a usable target model
    ///
    /// This is configuration misuse, detected at the node's first
    /// evaluation, and is distinct from both store failures and absence.
    #[error("no target model for {operation}: declared output is {shape}")]
    UnresolvedTarget {
        operation: &'static str,
        shape: String,
    },

    /// Custom failure raised by a user-supplied filter or assert closure
    #[error("predicate failed: {0}")]
    Predicate(String),
}

impl RouteError {
    /// Build a [`RouteError::Predicate`] from any message
    pub fn predicate(reason: impl Into<String>) -> Self {
        RouteError::Predicate(reason.into())
    }
}
