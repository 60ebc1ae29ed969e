// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw filesystem change events, as reduced by [`crate::scanner`] before any
//! watcher-specific semantic extraction happens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
    Moved,
    Renamed,
}

weft_core::simple_display! {
    ChangeType {
        Created => "created",
        Modified => "modified",
        Deleted => "deleted",
        Moved => "moved",
        Renamed => "renamed",
    }
}

/// A single field-level delta detected between two ticks of the same file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldChange {
    pub field_name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub change_type: FieldChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChangeKind {
    Added,
    Removed,
    Changed,
}

/// Raw file-level change, as produced by the scan/diff loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEvent {
    pub path: PathBuf,
    pub change_type: ChangeType,
    pub watcher_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl FileEvent {
    pub fn new(path: PathBuf, change_type: ChangeType, watcher_name: impl Into<String>) -> Self {
        Self {
            path,
            change_type,
            watcher_name: watcher_name.into(),
            old_path: None,
            old_content: None,
            new_content: None,
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    weft_core::setters! {
        option { old_path: PathBuf }
        option { old_content: String }
        option { new_content: String }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
