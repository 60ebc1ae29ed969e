//! Memo inbox watcher: threshold-crossing emits exactly once (spec.md §8
//! scenario 5).

use crate::prelude::*;
use weft_watch::memo::MemoWatcher;
use weft_watch::{PollingWatcher, WatchConfig};

fn memo_inbox(records: &[&str]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, text)| format!("## [{:04x}] record\n{text}\n\n", i + 1))
        .collect()
}

#[tokio::test]
async fn threshold_fires_exactly_once_on_the_crossing_tick() {
    let dir = tempdir().expect("tempdir");
    let bus = EventBus::new();
    let recorder = RecordingSubscriber::new();
    bus.subscribe(EventType::MemoThreshold, recorder.clone()).await;

    let path = dir.path().join("inbox.md");
    let watcher = PollingWatcher::new(WatchConfig::new(dir.path()), MemoWatcher::new(5), bus.clone());

    // Tick 0: empty inbox doesn't exist yet, establishes the baseline.
    watcher.tick().await.expect("baseline tick");

    // Ticks across which the count climbs to 5, one record at a time,
    // never emitting threshold until the crossing tick.
    for n in 1..=4 {
        let records: Vec<String> = (1..=n).map(|i| format!("entry {i}")).collect();
        let refs: Vec<&str> = records.iter().map(String::as_str).collect();
        write_file(&path, &memo_inbox(&refs));
        watcher.tick().await.expect("sub-threshold tick");
    }
    assert_eq!(recorder.snapshot().await.len(), 0, "no threshold event below the count");

    let five: Vec<String> = (1..=5).map(|i| format!("entry {i}")).collect();
    let five_refs: Vec<&str> = five.iter().map(String::as_str).collect();
    write_file(&path, &memo_inbox(&five_refs));
    let emitted = watcher.tick().await.expect("crossing tick");

    let thresholds: Vec<_> = emitted.iter().filter(|e| e.event_type() == EventType::MemoThreshold).collect();
    assert_eq!(thresholds.len(), 1, "exactly one threshold event on the crossing tick");
    assert_eq!(thresholds[0].get("count").and_then(|v| v.as_u64()), Some(5));
    assert_eq!(recorder.snapshot().await.len(), 1);

    // One more tick at the same count re-crosses nothing: still no event.
    watcher.tick().await.expect("steady tick");
    assert_eq!(recorder.snapshot().await.len(), 1, "no repeat threshold event while count stays >= threshold");
}
