use super::super::{build_router, AppState};
use crate::registry::ProjectRegistry;
use crate::signature;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;
use weft_mailbox::{LockManager, MailboxStore, Message, MessageContent, MessageId, MessageStateManager, MessageType};

const PREFIX: &str = "/api/v1/courier";

fn message(id: &str, provider: &str) -> Message {
    Message {
        id: MessageId::from_string(id),
        provider: provider.to_string(),
        timestamp: Utc::now(),
        message_type: MessageType::Text,
        content: MessageContent { text: Some("hello".to_string()), markdown: None },
        session: None,
        participants: Vec::new(),
        correlation_id: None,
        reply_to: None,
        thread_root: None,
        artifacts: Vec::new(),
        mentions: Vec::new(),
        body: "hello".to_string(),
    }
}

fn app(mailbox_root: &std::path::Path, registry_path: &std::path::Path) -> axum::Router {
    let store = MailboxStore::new(mailbox_root);
    let locks = LockManager::load(store.clone()).unwrap();
    let state_manager = Arc::new(MessageStateManager::new(store, locks));
    let registry = Arc::new(ProjectRegistry::load(registry_path).unwrap());
    build_router(PREFIX, AppState::new(state_manager, registry))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let dir = tempdir().unwrap();
    let app = app(&dir.path().join("mailbox"), &dir.path().join("registry.json"));
    let response = app.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn get_message_for_unknown_id_is_404() {
    let dir = tempdir().unwrap();
    let app = app(&dir.path().join("mailbox"), &dir.path().join("registry.json"));
    let response = app
        .oneshot(Request::builder().uri(format!("{PREFIX}/messages/msg-does-not-exist")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn claim_then_get_reports_claimed_status() {
    let dir = tempdir().unwrap();
    let mailbox_root = dir.path().join("mailbox");
    let store = MailboxStore::new(&mailbox_root);
    let msg = message("msg-claimtest0000000001", "dingtalk");
    store.create_inbound_atomic(&msg).unwrap();

    let app = app(&mailbox_root, &dir.path().join("registry.json"));
    let claim_resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/claim", msg.id),
            json!({ "agent_id": "agent-1", "timeout": 300 }),
        ))
        .await
        .unwrap();
    assert_eq!(claim_resp.status(), StatusCode::OK);

    let get_resp = app
        .oneshot(Request::builder().uri(format!("{PREFIX}/messages/{}", msg.id)).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(get_resp).await;
    assert_eq!(body["status"], "claimed");
    assert_eq!(body["lock"]["claimed_by"], "agent-1");
}

#[tokio::test]
async fn second_claim_within_lease_returns_409_with_claimed_by() {
    let dir = tempdir().unwrap();
    let mailbox_root = dir.path().join("mailbox");
    let store = MailboxStore::new(&mailbox_root);
    let msg = message("msg-doubleclaim00000001", "dingtalk");
    store.create_inbound_atomic(&msg).unwrap();

    let app = app(&mailbox_root, &dir.path().join("registry.json"));
    let first = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/claim", msg.id),
            json!({ "agent_id": "agent-1", "timeout": 300 }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/claim", msg.id),
            json!({ "agent_id": "agent-2", "timeout": 300 }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["claimed_by"], "agent-1");
}

#[tokio::test]
async fn complete_archives_the_message() {
    let dir = tempdir().unwrap();
    let mailbox_root = dir.path().join("mailbox");
    let store = MailboxStore::new(&mailbox_root);
    let msg = message("msg-completetest0000001", "dingtalk");
    store.create_inbound_atomic(&msg).unwrap();

    let app = app(&mailbox_root, &dir.path().join("registry.json"));
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/claim", msg.id),
            json!({ "agent_id": "agent-1", "timeout": 300 }),
        ))
        .await
        .unwrap();

    let complete = app
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/complete", msg.id),
            json!({ "agent_id": "agent-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(complete.status(), StatusCode::OK);
    let body = body_json(complete).await;
    assert!(body["archived_path"].as_str().unwrap().contains("archive"));
}

#[tokio::test]
async fn fail_by_wrong_agent_is_403() {
    let dir = tempdir().unwrap();
    let mailbox_root = dir.path().join("mailbox");
    let store = MailboxStore::new(&mailbox_root);
    let msg = message("msg-wrongagent000000001", "dingtalk");
    store.create_inbound_atomic(&msg).unwrap();

    let app = app(&mailbox_root, &dir.path().join("registry.json"));
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/claim", msg.id),
            json!({ "agent_id": "agent-1", "timeout": 300 }),
        ))
        .await
        .unwrap();

    let fail = app
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/messages/{}/fail", msg.id),
            json!({ "agent_id": "agent-2", "reason": "nope" }),
        ))
        .await
        .unwrap();
    assert_eq!(fail.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn registry_register_then_list_round_trips() {
    let dir = tempdir().unwrap();
    let app = app(&dir.path().join("mailbox"), &dir.path().join("registry.json"));

    let register = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/registry/register"),
            json!({ "slug": "acme", "path": "/projects/acme" }),
        ))
        .await
        .unwrap();
    assert_eq!(register.status(), StatusCode::OK);

    let list = app
        .oneshot(Request::builder().method("POST").uri(format!("{PREFIX}/registry/list")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(list).await;
    assert_eq!(body["projects"][0]["slug"], "acme");
}

#[tokio::test]
async fn webhook_unknown_slug_is_404() {
    let dir = tempdir().unwrap();
    let app = app(&dir.path().join("mailbox"), &dir.path().join("registry.json"));
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/webhook/dingtalk/nope?timestamp=1700000000000&sign=abc"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_rejects_a_bad_signature_and_accepts_a_good_one() {
    let dir = tempdir().unwrap();
    let registry_path = dir.path().join("registry.json");
    {
        let registry = ProjectRegistry::load(&registry_path).unwrap();
        registry
            .register("acme", std::path::PathBuf::from("/projects/acme"), json!({ "webhook_secret": "s3cr3t" }))
            .unwrap();
    }
    let app = app(&dir.path().join("mailbox"), &registry_path);

    let bad = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/webhook/dingtalk/acme?timestamp=1700000000000&sign=bad-signature"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    let sign = signature::compute("s3cr3t", 1_700_000_000_000);
    let good = app
        .oneshot(json_request(
            "POST",
            &format!("{PREFIX}/webhook/dingtalk/acme?timestamp=1700000000000&sign={sign}"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(good.status(), StatusCode::OK);
}
