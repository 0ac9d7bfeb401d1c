//! Role-based access control on top of the resolution engine
//!
//! [`AuthBackend`] is the pluggable contract a host authentication layer
//! calls into; [`RouteBackend`] fulfills it with three pre-built routes
//! (credentials to user, user to role, role to privileges), each call being
//! one top-level resolution with its own scratchpad.

use crate::error::Result;
use crate::route::Route;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Pluggable authentication/authorization backend
///
/// Absence is a first-class outcome on every operation: an unknown user or
/// a roleless user is `Ok(None)`, not an error. Errors are reserved for the
/// backend's own failures (store outages, misconfiguration).
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolves raw credentials to a user record
    ///
    /// `Ok(None)` means authentication found no matching user.
    async fn authenticate_user(&self, credentials: Value) -> Result<Option<Value>>;

    /// Resolves a user record to its role record
    async fn user_get_role(&self, user: Value) -> Result<Option<Value>>;

    /// Checks whether a role record carries a required privilege
    ///
    /// `false` covers both a role without the privilege and a role that
    /// resolved to nothing.
    async fn role_has_privilege(&self, role: Value, required: &Value) -> Result<bool>;
}

/// [`AuthBackend`] backed by three resolution routes
///
/// Which collections play the credential, user, and role parts is decided
/// entirely by how the host wires the routes; the backend itself is
/// store-agnostic.
#[derive(Debug, Clone)]
pub struct RouteBackend {
    user_route: Route,
    role_route: Route,
    privilege_route: Route,
}

impl RouteBackend {
    /// Creates a backend from its three routes
    ///
    /// # Arguments
    ///
    /// * `user_route` - Resolves credentials to a user record
    /// * `role_route` - Resolves a user record to a role record
    /// * `privilege_route` - Resolves a role record to its privilege
    ///   collection, tested by membership
    pub fn new(user_route: Route, role_route: Route, privilege_route: Route) -> Self {
        Self {
            user_route,
            role_route,
            privilege_route,
        }
    }
}

#[async_trait]
impl AuthBackend for RouteBackend {
    async fn authenticate_user(&self, credentials: Value) -> Result<Option<Value>> {
        let user = self.user_route.resolve(credentials).await?;
        debug!(found = user.is_some(), "authenticate_user resolved");
        Ok(user)
    }

    async fn user_get_role(&self, user: Value) -> Result<Option<Value>> {
        let role = self.role_route.resolve(user).await?;
        debug!(found = role.is_some(), "user_get_role resolved");
        Ok(role)
    }

    async fn role_has_privilege(&self, role: Value, required: &Value) -> Result<bool> {
        let granted = self
            .privilege_route
            .resolve_and_compare(role, required)
            .await?;
        debug!(granted, "role_has_privilege resolved");
        Ok(granted)
    }
}
