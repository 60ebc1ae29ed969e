// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::super::scheduler::FakeScheduler;
use super::*;
use std::collections::HashMap;
use std::sync::Arc;
use weft_bus::{Event, EventType};

fn event_with_role(role: &str) -> Event {
    let mut payload = HashMap::new();
    payload.insert("role".to_string(), serde_json::json!(role));
    payload.insert("issue_id".to_string(), serde_json::json!("ISSUE-1"));
    Event::new(EventType::IssueCreated, payload)
}

#[tokio::test]
async fn schedules_with_the_configured_role_prompt_and_engine() {
    let scheduler = Arc::new(FakeScheduler::new(2));
    let action = SpawnAgentAction::new("spawn", scheduler.clone()).with_role(
        "Reviewer",
        RoleConfig { prompt_template: "review {{issue_id}}".to_string(), engine: "codex".to_string() },
    );

    let result = action.execute(&event_with_role("Reviewer")).await.expect("execute");
    assert!(result.success);

    let scheduled = scheduler.scheduled();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].role, "Reviewer");
    assert_eq!(scheduled[0].prompt, "review {{issue_id}}");
    assert_eq!(scheduled[0].engine, "codex");
}

#[tokio::test]
async fn unknown_role_falls_back_to_default_config() {
    let scheduler = Arc::new(FakeScheduler::new(2));
    let action = SpawnAgentAction::new("spawn", scheduler.clone());

    let mut payload = HashMap::new();
    payload.insert("issue_id".to_string(), serde_json::json!("ISSUE-2"));
    let event = Event::new(EventType::IssueCreated, payload);

    let result = action.execute(&event).await.expect("execute");
    assert!(result.success);
    assert_eq!(result.output.unwrap()["role"], "Engineer");
}

#[tokio::test]
async fn can_execute_is_false_once_at_capacity() {
    let scheduler = Arc::new(FakeScheduler::new(1));
    let action = SpawnAgentAction::new("spawn", scheduler.clone());

    let event = event_with_role("Engineer");
    assert!(action.can_execute(&event).await);
    action.execute(&event).await.expect("execute");
    assert!(!action.can_execute(&event).await);
}
