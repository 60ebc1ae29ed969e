// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Action` capability: a guard, a body, and the uniform invocation
//! wrapper that times, guards, and never lets an execution error escape to
//! the router.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use weft_bus::Event;
use weft_core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
    Cancelled,
}

weft_core::simple_display! {
    ActionStatus {
        Pending => "pending",
        Running => "running",
        Success => "success",
        Failed => "failed",
        Skipped => "skipped",
        Cancelled => "cancelled",
    }
}

/// The outcome of one action execution.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ActionResult {
    pub fn success_result(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            status: ActionStatus::Success,
            output: Some(output.into()),
            error: None,
            metadata: HashMap::new(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn failure_result(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: ActionStatus::Failed,
            output: None,
            error: Some(error.into()),
            metadata: HashMap::new(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn skipped_result(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            status: ActionStatus::Skipped,
            output: None,
            error: Some(reason.into()),
            metadata: HashMap::new(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn backfill_timestamps(mut self, started_at: DateTime<Utc>, completed_at: DateTime<Utc>) -> Self {
        self.started_at.get_or_insert(started_at);
        self.completed_at.get_or_insert(completed_at);
        self
    }
}

/// A capability invoked in response to a matching event.
#[async_trait]
pub trait Action: Send + Sync {
    /// Unique name, used as the action-registry key.
    fn name(&self) -> &str;

    /// Guard evaluated before `execute`. Defaults to always-true.
    async fn can_execute(&self, _event: &Event) -> bool {
        true
    }

    /// The action's body. Errors are caught by [`Action::invoke`] and turned
    /// into a `failure_result` — implementations never need to do that
    /// themselves.
    async fn execute(&self, event: &Event) -> Result<ActionResult>;

    /// The uniform invocation wrapper: timestamps, evaluates the guard,
    /// executes, and converts any propagated error into a failure result.
    async fn invoke(&self, event: &Event) -> ActionResult {
        let started_at = Utc::now();

        if !self.can_execute(event).await {
            return ActionResult::skipped_result("Conditions not met")
                .backfill_timestamps(started_at, Utc::now());
        }

        let result = match self.execute(event).await {
            Ok(result) => result,
            Err(err) => ActionResult::failure_result(err.to_string()),
        };
        let completed_at = Utc::now();
        result.backfill_timestamps(started_at, completed_at)
    }
}

/// An action built from a predicate closure and a body closure, for small
/// inline rules that don't warrant a dedicated struct.
pub struct ConditionalAction<P, B> {
    name: String,
    predicate: P,
    body: B,
}

impl<P, B> ConditionalAction<P, B> {
    pub fn new(name: impl Into<String>, predicate: P, body: B) -> Self {
        Self { name: name.into(), predicate, body }
    }
}

#[async_trait]
impl<P, B, PFut, BFut> Action for ConditionalAction<P, B>
where
    P: Fn(&Event) -> PFut + Send + Sync,
    PFut: std::future::Future<Output = bool> + Send,
    B: Fn(&Event) -> BFut + Send + Sync,
    BFut: std::future::Future<Output = Result<Value>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_execute(&self, event: &Event) -> bool {
        (self.predicate)(event).await
    }

    async fn execute(&self, event: &Event) -> Result<ActionResult> {
        let output = (self.body)(event).await?;
        Ok(ActionResult::success_result(output))
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
