//! End-to-end RBAC scenarios over the canonical wiring
//!
//! Credentials resolve to a user, the user to a role, and the role to its
//! privilege collection. Covers every decision path a host can hit: grants,
//! denials, absent users and roles, and store outages.

mod common;

use auth_route::{AuthBackend, RouteError, StoreError};
use common::{backend_over, init_tracing, seeded_store, FailingStore};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_admin_full_decision_flow() {
    init_tracing();
    let backend = backend_over(seeded_store().await);

    let user = backend
        .authenticate_user(json!({ "user": "alice" }))
        .await
        .unwrap()
        .expect("alice is in the store");
    assert_eq!(user["role"], json!("admin"));

    let role = backend
        .user_get_role(user)
        .await
        .unwrap()
        .expect("the admin role exists");
    assert_eq!(role["name"], json!("admin"));

    assert!(backend
        .role_has_privilege(role.clone(), &json!("write"))
        .await
        .unwrap());
    assert!(!backend
        .role_has_privilege(role, &json!("audit"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_viewer_is_limited_to_reading() {
    init_tracing();
    let backend = backend_over(seeded_store().await);

    let user = backend
        .authenticate_user(json!({ "user": "bob" }))
        .await
        .unwrap()
        .unwrap();
    let role = backend.user_get_role(user).await.unwrap().unwrap();

    assert!(backend
        .role_has_privilege(role.clone(), &json!("read"))
        .await
        .unwrap());
    assert!(!backend
        .role_has_privilege(role.clone(), &json!("write"))
        .await
        .unwrap());
    assert!(!backend
        .role_has_privilege(role, &json!("grant"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_unknown_user_is_absent_not_an_error() {
    init_tracing();
    let backend = backend_over(seeded_store().await);

    let outcome = backend
        .authenticate_user(json!({ "user": "mallory" }))
        .await
        .unwrap();
    assert!(outcome.is_none());

    // Credentials without the expected field behave the same way
    let outcome = backend
        .authenticate_user(json!({ "token": "opaque" }))
        .await
        .unwrap();
    assert!(outcome.is_none());
}

#[tokio::test]
async fn test_unmatched_role_resolves_to_nothing() {
    init_tracing();
    let backend = backend_over(seeded_store().await);

    // carol authenticates fine, but her declared role has no record
    let user = backend
        .authenticate_user(json!({ "user": "carol" }))
        .await
        .unwrap()
        .unwrap();
    let role = backend.user_get_role(user).await.unwrap();
    assert!(role.is_none());

    // A role document without a privilege collection grants nothing
    assert!(!backend
        .role_has_privilege(json!({ "name": "intern" }), &json!("read"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_store_failure_reaches_caller_verbatim() {
    init_tracing();
    let backend = backend_over(Arc::new(FailingStore));

    // The role lookup is the relation hop that hits the dead store
    let err = backend
        .user_get_role(json!({ "name": "alice", "role": "admin" }))
        .await
        .unwrap_err();
    match err {
        RouteError::Store(inner) => {
            assert_eq!(inner, StoreError::Unavailable("store offline".into()));
        }
        other => panic!("expected store error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_decisions_share_one_backend() {
    init_tracing();
    let backend: Arc<dyn AuthBackend> = Arc::new(backend_over(seeded_store().await));

    let mut handles = Vec::new();
    for i in 0..12 {
        let backend = Arc::clone(&backend);
        let (name, privilege) = match i % 3 {
            0 => ("alice", "write"),
            1 => ("bob", "write"),
            _ => ("mallory", "read"),
        };
        handles.push(tokio::spawn(async move {
            let user = backend
                .authenticate_user(json!({ "user": name }))
                .await
                .unwrap();
            let granted = match user {
                Some(user) => {
                    let role = backend.user_get_role(user).await.unwrap();
                    match role {
                        Some(role) => backend
                            .role_has_privilege(role, &json!(privilege))
                            .await
                            .unwrap(),
                        None => false,
                    }
                }
                None => false,
            };
            (name, granted)
        }));
    }

    for handle in handles {
        let (name, granted) = handle.await.unwrap();
        assert_eq!(granted, name == "alice", "only the admin may write");
    }
}
