// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The artifact record and its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

weft_core::define_id! {
    /// Opaque unique handle for an artifact record, distinct per `store` call.
    pub struct ArtifactId("art-");
}

/// Where an artifact's bytes originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Generated,
    Uploaded,
    Imported,
    Derived,
}

weft_core::simple_display! {
    SourceType {
        Generated => "generated",
        Uploaded => "uploaded",
        Imported => "imported",
        Derived => "derived",
    }
}

/// Lifecycle state of an artifact record.
///
/// `Expired` and `Deleted` are both terminal from the caller's perspective,
/// but only `Deleted` (via hard delete) ever removes the manifest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Archived,
    Expired,
    Deleted,
}

weft_core::simple_display! {
    Status {
        Active => "active",
        Archived => "archived",
        Expired => "expired",
        Deleted => "deleted",
    }
}

/// An artifact record: metadata pointing at a content-addressed byte blob.
///
/// `content_hash` is a pure function of the stored bytes; many artifacts may
/// share one hash (dedup). `size_bytes` always matches the stored byte length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: ArtifactId,
    pub content_hash: String,
    pub source_type: SourceType,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_artifact_id: Option<ArtifactId>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Artifact {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn is_deleted(&self) -> bool {
        self.status == Status::Deleted
    }
}
