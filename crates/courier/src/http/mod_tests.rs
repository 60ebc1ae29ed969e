use super::*;
use crate::registry::ProjectRegistry;
use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;
use weft_mailbox::{LockManager, MailboxStore, MessageStateManager};

#[tokio::test]
async fn health_route_is_mounted_outside_the_prefix() {
    let dir = tempdir().unwrap();
    let store = MailboxStore::new(dir.path().join("mailbox"));
    let locks = LockManager::load(store.clone()).unwrap();
    let state_manager = Arc::new(MessageStateManager::new(store, locks));
    let registry = Arc::new(ProjectRegistry::load(dir.path().join("registry.json")).unwrap());
    let router = build_router("/api/v1/courier", AppState::new(state_manager, registry));

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

#[test]
fn with_adapters_overrides_the_default_empty_list() {
    let state_manager = Arc::new(MessageStateManager::new(
        MailboxStore::new("/tmp/does-not-matter"),
        LockManager::load(MailboxStore::new("/tmp/does-not-matter")).unwrap(),
    ));
    let registry = Arc::new(ProjectRegistry::load("/tmp/does-not-matter-registry.json").unwrap());
    let state = AppState::new(state_manager, registry).with_adapters(vec!["dingtalk".to_string()]);
    assert_eq!(state.adapters, vec!["dingtalk".to_string()]);
}
