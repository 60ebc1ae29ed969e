// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::MessageId;
use crate::store::MailboxStore;

fn manager(dir: &std::path::Path) -> LockManager {
    LockManager::load(MailboxStore::new(dir)).expect("load")
}

#[test]
fn claim_then_second_claim_is_already_claimed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    let id = MessageId::from_string("msg-1");

    let lock = locks.claim(&id, "agent-1", 300).expect("claim");
    assert_eq!(lock.status, LockStatus::Claimed);
    assert_eq!(lock.claimed_by.as_deref(), Some("agent-1"));

    let err = locks.claim(&id, "agent-2", 300).unwrap_err();
    assert!(err.to_string().contains("already_claimed"));
}

#[test]
fn complete_requires_the_claiming_agent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    let id = MessageId::from_string("msg-2");
    locks.claim(&id, "agent-1", 300).expect("claim");

    let err = locks.complete(&id, "agent-2").unwrap_err();
    assert!(err.to_string().contains("claimed_by_other"));

    let lock = locks.complete(&id, "agent-1").expect("complete");
    assert_eq!(lock.status, LockStatus::Completed);
    assert_eq!(lock.retry_count, 0);
}

#[test]
fn fail_with_retryable_redelivers_until_max_attempts_then_deadletters() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    let id = MessageId::from_string("msg-3");

    for _ in 0..MAX_RETRY_ATTEMPTS {
        locks.claim(&id, "agent-1", 300).expect("claim");
        let lock = locks.fail(&id, "agent-1", "boom", true).expect("fail");
        assert_eq!(lock.status, LockStatus::New);
    }

    locks.claim(&id, "agent-1", 300).expect("claim");
    let lock = locks.fail(&id, "agent-1", "boom", true).expect("fail");
    assert_eq!(lock.status, LockStatus::Deadletter);
}

#[test]
fn fail_with_retryable_false_deadletters_immediately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    let id = MessageId::from_string("msg-4");
    locks.claim(&id, "agent-1", 300).expect("claim");

    let lock = locks.fail(&id, "agent-1", "fatal", false).expect("fail");
    assert_eq!(lock.status, LockStatus::Deadletter);
}

#[test]
fn all_entries_snapshots_every_lock_in_the_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    locks.claim(&MessageId::from_string("msg-a"), "agent-1", 300).expect("claim a");
    locks.claim(&MessageId::from_string("msg-b"), "agent-1", 300).expect("claim b");

    let mut ids: Vec<String> = locks.all_entries().into_iter().map(|e| e.message_id.to_string()).collect();
    ids.sort();
    assert_eq!(ids, vec!["msg-a".to_string(), "msg-b".to_string()]);
}

#[test]
fn get_status_reverts_an_expired_claim_to_new() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locks = manager(dir.path());
    let id = MessageId::from_string("msg-5");
    locks.claim(&id, "agent-1", -1).expect("claim with negative timeout");

    let status = locks.get_status(&id).expect("status");
    assert_eq!(status.status, LockStatus::New);
}

#[test]
fn backoff_policy_caps_at_max_secs() {
    let policy = BackoffPolicy { base_secs: 5, multiplier: 2.0, max_secs: 30 };
    assert_eq!(policy.backoff_for(0), std::time::Duration::from_secs(5));
    assert_eq!(policy.backoff_for(1), std::time::Duration::from_secs(10));
    assert_eq!(policy.backoff_for(10), std::time::Duration::from_secs(30));
}

#[test]
fn message_state_manager_archives_on_complete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = MailboxStore::new(dir.path());
    let msg = crate::model::Message {
        id: MessageId::from_string("msg-6"),
        provider: "slack".to_string(),
        timestamp: chrono::Utc::now(),
        message_type: crate::model::MessageType::Text,
        content: crate::model::MessageContent { text: Some("hi".to_string()), markdown: None },
        session: None,
        participants: Vec::new(),
        correlation_id: None,
        reply_to: None,
        thread_root: None,
        artifacts: Vec::new(),
        mentions: Vec::new(),
        body: "hi".to_string(),
    };
    store.create_inbound_atomic(&msg).expect("create");

    let locks = LockManager::load(store.clone()).expect("load");
    let manager = MessageStateManager::new(store, locks);
    manager.claim(&msg.id, "agent-1", 300).expect("claim");

    let (lock, archived) = manager.complete(&msg.id, "agent-1").expect("complete");
    assert_eq!(lock.status, LockStatus::Completed);
    let archived = archived.expect("archived path");
    assert!(archived.to_string_lossy().contains("archive"));
}
