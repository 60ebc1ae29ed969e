// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message and lock record shapes shared by inbound and outbound mail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

weft_core::define_id! {
    /// Handle for a mailbox message, stable across its inbound/outbound/
    /// archive/deadletter moves.
    pub struct MessageId("msg-");
}

/// The body rendering a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    #[default]
    Text,
    Markdown,
}

/// Inline content. `text` falls back to the file body when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

/// The conversation a message belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRef {
    pub id: String,
    #[serde(rename = "type", default)]
    pub session_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_key: Option<String>,
}

/// A mailbox message: frontmatter metadata plus body text.
///
/// The same shape serves both inbound and outbound messages; which
/// directory currently owns the file is what distinguishes them, not the
/// type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub provider: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionRef>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_root: Option<MessageId>,
    #[serde(default)]
    pub artifacts: Vec<String>,
    #[serde(default)]
    pub mentions: Vec<String>,
    /// Free-form body text, outside the frontmatter fence.
    #[serde(skip)]
    pub body: String,
}

impl Message {
    /// The effective text: `content.text`, else the raw body.
    pub fn effective_text(&self) -> &str {
        self.content.text.as_deref().unwrap_or(&self.body)
    }
}

/// Where a [`crate::lock::LockEntry`] stands in the claim lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStatus {
    New,
    Claimed,
    Completed,
    Failed,
    Deadletter,
}

weft_core::simple_display! {
    LockStatus {
        New => "new",
        Claimed => "claimed",
        Completed => "completed",
        Failed => "failed",
        Deadletter => "deadletter",
    }
}

/// A time-bounded exclusive claim on a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockEntry {
    pub message_id: MessageId,
    pub status: LockStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

impl LockEntry {
    pub fn new(message_id: MessageId) -> Self {
        Self {
            message_id,
            status: LockStatus::New,
            claimed_by: None,
            claimed_at: None,
            expires_at: None,
            retry_count: 0,
            fail_reason: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == LockStatus::Claimed && self.expires_at.map(|e| now >= e).unwrap_or(false)
    }
}

/// On-disk shape of `.state/locks.json`: a map keyed by message id.
pub type LockTable = HashMap<String, LockEntry>;
