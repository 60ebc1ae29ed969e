// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus-level event taxonomy.
//!
//! This is the closed set of semantic events the rest of the fabric reasons
//! about: issue lifecycle, memo thresholds, agent sessions, PR creation, IM
//! traffic, and mailbox arrivals. Watchers translate raw filesystem state
//! into these before publishing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The closed enum of event kinds flowing over the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    IssueCreated,
    IssueUpdated,
    IssueStageChanged,
    IssueStatusChanged,
    MemoCreated,
    MemoThreshold,
    SessionCompleted,
    SessionFailed,
    PrCreated,
    ImMessageReceived,
    ImMessageReplied,
    ImAgentTrigger,
    ImSessionStarted,
    ImSessionClosed,
    MailboxInboundReceived,
}

weft_core::simple_display! {
    EventType {
        IssueCreated => "issue.created",
        IssueUpdated => "issue.updated",
        IssueStageChanged => "issue.stage_changed",
        IssueStatusChanged => "issue.status_changed",
        MemoCreated => "memo.created",
        MemoThreshold => "memo.threshold",
        SessionCompleted => "session.completed",
        SessionFailed => "session.failed",
        PrCreated => "pr.created",
        ImMessageReceived => "im.message_received",
        ImMessageReplied => "im.message_replied",
        ImAgentTrigger => "im.agent_trigger",
        ImSessionStarted => "im.session_started",
        ImSessionClosed => "im.session_closed",
        MailboxInboundReceived => "mailbox.inbound_received",
    }
}

impl EventType {
    /// Parse the wire name (e.g. `"issue.stage_changed"`) back into a type.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "issue.created" => Self::IssueCreated,
            "issue.updated" => Self::IssueUpdated,
            "issue.stage_changed" => Self::IssueStageChanged,
            "issue.status_changed" => Self::IssueStatusChanged,
            "memo.created" => Self::MemoCreated,
            "memo.threshold" => Self::MemoThreshold,
            "session.completed" => Self::SessionCompleted,
            "session.failed" => Self::SessionFailed,
            "pr.created" => Self::PrCreated,
            "im.message_received" => Self::ImMessageReceived,
            "im.message_replied" => Self::ImMessageReplied,
            "im.agent_trigger" => Self::ImAgentTrigger,
            "im.session_started" => Self::ImSessionStarted,
            "im.session_closed" => Self::ImSessionClosed,
            "mailbox.inbound_received" => Self::MailboxInboundReceived,
            _ => return None,
        })
    }
}

/// A single event on the bus: a type tag, a free-form payload, and a
/// timestamp. Watchers are the producers; the action router is the
/// principal consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub payload: HashMap<String, Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Event {
    pub fn new(event_type: EventType, payload: HashMap<String, Value>) -> Self {
        Self { event_type, payload, timestamp: Utc::now(), source: None }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

weft_core::builder! {
    pub struct EventBuilder => Event {
        set { event_type: EventType = EventType::IssueCreated }
        set { payload: HashMap<String, Value> = HashMap::new() }
        option { source: String = None }
        computed { timestamp: DateTime<Utc> = Utc::now() }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
