// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox watcher: watches a provider-sharded inbound directory and emits
//! `mailbox.inbound_received` as soon as a new message file appears.

use crate::file_event::{ChangeType, FileEvent};
use crate::watcher::SemanticWatcher;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use weft_bus::{Event, EventType};
use weft_core::frontmatter;

#[derive(Debug, Deserialize)]
struct InboundSession {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InboundMeta {
    id: String,
    provider: String,
    #[serde(default)]
    session: Option<InboundSession>,
}

/// Watches `inbound/<provider>/` for newly arrived message files.
#[derive(Default)]
pub struct MailboxWatcher;

impl MailboxWatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SemanticWatcher for MailboxWatcher {
    fn name(&self) -> &str {
        "mailbox"
    }

    async fn reduce(&self, raw: &FileEvent) -> Vec<Event> {
        if raw.change_type != ChangeType::Created {
            return vec![];
        }
        let Some(content) = &raw.new_content else { return vec![] };
        let Ok((meta, _body)) = frontmatter::parse::<InboundMeta>(content) else { return vec![] };

        let mut payload = HashMap::new();
        payload.insert("provider".to_string(), json!(meta.provider));
        payload.insert("message_id".to_string(), json!(meta.id));
        payload.insert("path".to_string(), json!(raw.path.to_string_lossy()));
        if let Some(session_id) = meta.session.and_then(|s| s.id) {
            payload.insert("session_id".to_string(), json!(session_id));
        }
        vec![Event::new(EventType::MailboxInboundReceived, payload)]
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
