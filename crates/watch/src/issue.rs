// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Issue watcher: tracks a fixed set of frontmatter fields per issue file
//! and emits stage/status-specific events when those fields change.

use crate::file_event::{ChangeType, FieldChange, FieldChangeKind, FileEvent};
use crate::watcher::SemanticWatcher;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::Mutex;
use weft_bus::{Event, EventType};
use weft_core::frontmatter;

/// The fixed field set the issue watcher tracks.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IssueMetadata {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl IssueMetadata {
    fn tracked_changes(&self, other: &IssueMetadata) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        let fields: [(&str, &Option<String>, &Option<String>); 5] = [
            ("status", &self.status, &other.status),
            ("stage", &self.stage, &other.stage),
            ("assignee", &self.assignee, &other.assignee),
            ("criticality", &self.criticality, &other.criticality),
            ("title", &self.title, &other.title),
        ];
        for (name, old, new) in fields {
            if old != new {
                let kind = match (old, new) {
                    (None, Some(_)) => FieldChangeKind::Added,
                    (Some(_), None) => FieldChangeKind::Removed,
                    _ => FieldChangeKind::Changed,
                };
                changes.push(FieldChange {
                    field_name: name.to_string(),
                    old_value: old.clone(),
                    new_value: new.clone(),
                    change_type: kind,
                });
            }
        }
        changes
    }
}

/// Watches issue files for frontmatter-field changes.
pub struct IssueWatcher {
    cache: Mutex<HashMap<String, IssueMetadata>>,
}

impl Default for IssueWatcher {
    fn default() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }
}

impl IssueWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse(content: &str) -> Option<IssueMetadata> {
        frontmatter::parse::<IssueMetadata>(content).ok().map(|(meta, _body)| meta)
    }
}

#[async_trait]
impl SemanticWatcher for IssueWatcher {
    fn name(&self) -> &str {
        "issue"
    }

    async fn reduce(&self, raw: &FileEvent) -> Vec<Event> {
        match raw.change_type {
            ChangeType::Created => {
                let Some(content) = &raw.new_content else { return vec![] };
                let Some(meta) = Self::parse(content) else { return vec![] };
                let issue_id = meta.id.clone();
                self.cache.lock().await.insert(issue_id.clone(), meta.clone());
                vec![issue_event(EventType::IssueCreated, &issue_id, &raw.path, None, &[])]
            }
            ChangeType::Modified => {
                let Some(new_content) = &raw.new_content else { return vec![] };
                let Some(new_meta) = Self::parse(new_content) else { return vec![] };
                let issue_id = new_meta.id.clone();

                let old_meta = self.cache.lock().await.get(&issue_id).cloned().or_else(|| {
                    raw.old_content.as_deref().and_then(Self::parse)
                });
                let changes = old_meta.as_ref().map(|old| old.tracked_changes(&new_meta)).unwrap_or_default();
                self.cache.lock().await.insert(issue_id.clone(), new_meta.clone());

                let stage_change = changes.iter().find(|c| c.field_name == "stage");
                let status_change = changes.iter().find(|c| c.field_name == "status");

                let mut events = Vec::new();
                if let Some(change) = stage_change {
                    events.push(issue_event(EventType::IssueStageChanged, &issue_id, &raw.path, Some(change), &changes));
                }
                if let Some(change) = status_change {
                    events.push(issue_event(EventType::IssueStatusChanged, &issue_id, &raw.path, Some(change), &changes));
                }
                if events.is_empty() {
                    events.push(issue_event(EventType::IssueUpdated, &issue_id, &raw.path, None, &changes));
                }
                events
            }
            ChangeType::Deleted => {
                if let Some(content) = &raw.old_content {
                    if let Some(meta) = Self::parse(content) {
                        self.cache.lock().await.remove(&meta.id);
                    }
                }
                vec![]
            }
            ChangeType::Moved | ChangeType::Renamed => vec![],
        }
    }
}

/// Build the composite `IssueFileEvent` payload: `issue_id`, `path`, the
/// single field that triggered a dedicated stage/status event (if any), and
/// the full computed `field_changes` list so a plain `issue.updated` (or any
/// other tracked-field delta) is never lossy.
fn issue_event(
    event_type: EventType,
    issue_id: &str,
    path: &std::path::Path,
    change: Option<&FieldChange>,
    field_changes: &[FieldChange],
) -> Event {
    let mut payload = HashMap::new();
    payload.insert("issue_id".to_string(), json!(issue_id));
    payload.insert("path".to_string(), json!(path.to_string_lossy()));
    if let Some(change) = change {
        payload.insert("field".to_string(), json!(change.field_name));
        payload.insert("old_value".to_string(), json!(change.old_value));
        payload.insert("new_value".to_string(), json!(change.new_value));
    }
    if !field_changes.is_empty() {
        payload.insert("field_changes".to_string(), json!(field_changes));
    }
    Event::new(event_type, payload)
}

#[cfg(test)]
#[path = "issue_tests.rs"]
mod tests;
