// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memo watcher: counts `## [hex-uid] ...` records in a single inbox file
//! and emits a threshold-crossing event exactly once per crossing.

use crate::file_event::{ChangeType, FileEvent};
use crate::watcher::SemanticWatcher;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use weft_bus::{Event, EventType};

/// Count `## [hex]` record headers in `content`.
pub fn count_records(content: &str) -> usize {
    content
        .lines()
        .filter(|line| {
            let Some(rest) = line.trim_start().strip_prefix("## [") else { return false };
            let Some((hex, _)) = rest.split_once(']') else { return false };
            !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit())
        })
        .count()
}

/// Watches a memo inbox file for its record count crossing `threshold`.
pub struct MemoWatcher {
    threshold: usize,
    counts: Mutex<HashMap<PathBuf, usize>>,
}

impl MemoWatcher {
    pub fn new(threshold: usize) -> Self {
        Self { threshold, counts: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl SemanticWatcher for MemoWatcher {
    fn name(&self) -> &str {
        "memo"
    }

    async fn reduce(&self, raw: &FileEvent) -> Vec<Event> {
        match raw.change_type {
            ChangeType::Created => {
                let Some(content) = &raw.new_content else { return vec![] };
                let count = count_records(content);
                self.counts.lock().await.insert(raw.path.clone(), count);

                let mut events = vec![memo_event(EventType::MemoCreated, &raw.path, count)];
                if count >= self.threshold {
                    events.push(memo_event(EventType::MemoThreshold, &raw.path, count));
                }
                events
            }
            ChangeType::Modified => {
                let Some(content) = &raw.new_content else { return vec![] };
                let new_count = count_records(content);
                let old_count = {
                    let mut counts = self.counts.lock().await;
                    let old = counts.get(&raw.path).copied().unwrap_or(0);
                    counts.insert(raw.path.clone(), new_count);
                    old
                };

                if new_count == 0 && old_count > 0 {
                    info!(path = %raw.path.display(), "inbox-cleared");
                    return vec![];
                }

                if new_count > old_count {
                    if old_count < self.threshold && new_count >= self.threshold {
                        return vec![memo_event(EventType::MemoThreshold, &raw.path, new_count)];
                    }
                    if new_count < self.threshold {
                        info!(path = %raw.path.display(), count = new_count, "memos_added");
                    }
                }
                vec![]
            }
            ChangeType::Deleted => {
                self.counts.lock().await.remove(&raw.path);
                vec![]
            }
            ChangeType::Moved | ChangeType::Renamed => vec![],
        }
    }
}

fn memo_event(event_type: EventType, path: &std::path::Path, count: usize) -> Event {
    let mut payload = HashMap::new();
    payload.insert("path".to_string(), json!(path.to_string_lossy()));
    payload.insert("count".to_string(), json!(count));
    Event::new(event_type, payload)
}

/// Shared handle alias used by wiring code; [`MemoWatcher`] has no mutable
/// state that requires external synchronization beyond its own mutex.
pub type SharedMemoWatcher = Arc<MemoWatcher>;

#[cfg(test)]
#[path = "memo_tests.rs"]
mod tests;
