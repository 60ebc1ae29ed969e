//! Watcher → bus → router pipeline: issue stage transitions (spec.md §8
//! scenario 4 and invariant 5).

use crate::prelude::*;
use weft_router::ActionRouter;
use weft_watch::{PollingWatcher, WatchConfig};

fn issue_file(id: &str, stage: &str) -> String {
    format!("---\nid = \"{id}\"\nstage = \"{stage}\"\n---\nbody\n")
}

#[tokio::test]
async fn stage_transition_emits_exactly_one_stage_changed_and_no_updated() {
    let dir = tempdir().expect("tempdir");
    let bus = EventBus::new();
    let recorder = RecordingSubscriber::new();
    bus.subscribe(EventType::IssueStageChanged, recorder.clone()).await;
    bus.subscribe(EventType::IssueUpdated, recorder.clone()).await;
    bus.subscribe(EventType::IssueCreated, recorder.clone()).await;

    let path = dir.path().join("ISSUE-1.md");
    write_file(&path, &issue_file("ISSUE-1", "backlog"));

    let watcher = PollingWatcher::new(WatchConfig::new(dir.path()), weft_watch::issue::IssueWatcher::new(), bus.clone());
    watcher.tick().await.expect("created tick").into_iter().for_each(drop);

    write_file(&path, &issue_file("ISSUE-1", "doing"));
    let emitted = watcher.tick().await.expect("stage-change tick");

    assert_eq!(emitted.len(), 1, "exactly one event for the stage transition");
    assert_eq!(emitted[0].event_type(), EventType::IssueStageChanged);
    assert_eq!(emitted[0].get("old_value").and_then(|v| v.as_str()), Some("backlog"));
    assert_eq!(emitted[0].get("new_value").and_then(|v| v.as_str()), Some("doing"));
    assert_eq!(emitted[0].get("field").and_then(|v| v.as_str()), Some("stage"));

    let types = recorder.types().await;
    assert_eq!(types.iter().filter(|t| **t == EventType::IssueStageChanged).count(), 1);
    assert_eq!(types.iter().filter(|t| **t == EventType::IssueUpdated).count(), 0);
}

#[tokio::test]
async fn stage_changed_event_dispatches_through_the_router_in_priority_order() {
    let dir = tempdir().expect("tempdir");
    let bus = EventBus::new();
    let path = dir.path().join("ISSUE-2.md");
    write_file(&path, &issue_file("ISSUE-2", "backlog"));

    let watcher = PollingWatcher::new(WatchConfig::new(dir.path()), weft_watch::issue::IssueWatcher::new(), bus.clone());
    watcher.tick().await.expect("created tick");
    write_file(&path, &issue_file("ISSUE-2", "review"));

    let router = Arc::new(ActionRouter::new(bus.clone()));
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let low = order.clone();
    let high = order.clone();
    router
        .register(
            vec![EventType::IssueStageChanged],
            Arc::new(weft_router::action::ConditionalAction::new(
                "low-priority",
                |_event: &Event| async { true },
                move |_event: &Event| {
                    let low = low.clone();
                    async move {
                        low.lock().await.push("low");
                        Ok(serde_json::json!({}))
                    }
                },
            )),
            None,
            1,
        )
        .await;
    router
        .register(
            vec![EventType::IssueStageChanged],
            Arc::new(weft_router::action::ConditionalAction::new(
                "high-priority",
                |_event: &Event| async { true },
                move |_event: &Event| {
                    let high = high.clone();
                    async move {
                        high.lock().await.push("high");
                        Ok(serde_json::json!({}))
                    }
                },
            )),
            None,
            10,
        )
        .await;

    router.start().await;
    let emitted = watcher.tick().await.expect("stage-change tick");
    assert_eq!(emitted.len(), 1);
    bus.publish(emitted.into_iter().next().expect("one event")).await;

    assert_eq!(*order.lock().await, vec!["high", "low"], "higher priority rule runs first");
    assert_eq!(router.history_len().await, 2);
}
