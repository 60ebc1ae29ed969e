// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-list watcher: parses markdown checkbox items, assigns each a stable
//! id derived from its line number and text (not its checked state, so
//! toggling a box doesn't mint a new id), and diffs ids across ticks.
//!
//! There is no `task.*` member in the closed bus [`weft_bus::EventType`]
//! enum, so `reduce` never publishes — task changes are surfaced only to
//! local `on_emit` callbacks and via [`TaskWatcher::diff_tasks`] for direct
//! callers (the CLI, tests).

use crate::file_event::{ChangeType, FileEvent};
use crate::watcher::SemanticWatcher;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use weft_bus::Event;

/// A single parsed checkbox item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskChangeKind {
    Created,
    Deleted,
    StateChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    pub id: String,
    pub kind: TaskChangeKind,
    pub is_completed: bool,
}

/// Derive a stable 96-bit (24 hex char) id from a task's line number and text.
pub fn task_id(line_no: usize, text: &str) -> String {
    let digest = Sha256::digest(format!("{line_no}:{text}").as_bytes());
    hex::encode(&digest[..12])
}

/// Parse `- [ ] text` / `- [x] text` checkbox items from markdown content.
pub fn parse_tasks(content: &str) -> Vec<TaskItem> {
    let mut items = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("- [").or_else(|| trimmed.strip_prefix("* [")) else {
            continue;
        };
        let Some((marker, text)) = rest.split_once(']') else { continue };
        let is_completed = matches!(marker, "x" | "X");
        if !(marker.is_empty() || marker == " " || is_completed) {
            continue;
        }
        let text = text.trim().to_string();
        items.push(TaskItem { id: task_id(idx, &text), text, is_completed });
    }
    items
}

/// Watches a task-list file for checkbox create/delete/toggle changes.
pub struct TaskWatcher {
    cache: Mutex<HashMap<PathBuf, HashMap<String, TaskItem>>>,
}

impl Default for TaskWatcher {
    fn default() -> Self {
        Self { cache: Mutex::new(HashMap::new()) }
    }
}

impl TaskWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the create/delete/state-changed diff for one tick without
    /// going through the `SemanticWatcher` plumbing.
    pub async fn diff_tasks(&self, path: &std::path::Path, content: &str) -> Vec<TaskChange> {
        let new_items = parse_tasks(content);
        let new_map: HashMap<String, TaskItem> =
            new_items.into_iter().map(|t| (t.id.clone(), t)).collect();

        let mut cache = self.cache.lock().await;
        let old_map = cache.get(path).cloned().unwrap_or_default();

        let mut changes = Vec::new();
        for (id, item) in &new_map {
            match old_map.get(id) {
                None => changes.push(TaskChange { id: id.clone(), kind: TaskChangeKind::Created, is_completed: item.is_completed }),
                Some(old) if old.is_completed != item.is_completed => {
                    changes.push(TaskChange { id: id.clone(), kind: TaskChangeKind::StateChanged, is_completed: item.is_completed })
                }
                Some(_) => {}
            }
        }
        for (id, item) in &old_map {
            if !new_map.contains_key(id) {
                changes.push(TaskChange { id: id.clone(), kind: TaskChangeKind::Deleted, is_completed: item.is_completed });
            }
        }

        cache.insert(path.to_path_buf(), new_map);
        changes
    }
}

#[async_trait]
impl SemanticWatcher for TaskWatcher {
    fn name(&self) -> &str {
        "task"
    }

    async fn reduce(&self, raw: &FileEvent) -> Vec<Event> {
        match raw.change_type {
            ChangeType::Created | ChangeType::Modified => {
                if let Some(content) = &raw.new_content {
                    self.diff_tasks(&raw.path, content).await;
                }
            }
            ChangeType::Deleted => {
                self.cache.lock().await.remove(&raw.path);
            }
            ChangeType::Moved | ChangeType::Renamed => {}
        }
        vec![]
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
