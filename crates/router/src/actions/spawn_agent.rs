// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `spawn-agent` built-in action: checks scheduler capacity, maps an event's
//! role to a prompt/engine pair, and submits a [`SpawnTask`].

use super::scheduler::{Scheduler, SpawnTask};
use crate::action::{Action, ActionResult};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use weft_bus::Event;
use weft_core::error::Result;

/// A role's default prompt template and target engine.
#[derive(Debug, Clone)]
pub struct RoleConfig {
    pub prompt_template: String,
    pub engine: String,
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self { prompt_template: "Act as an engineer on: {{issue_id}}".to_string(), engine: "claude".to_string() }
    }
}

pub struct SpawnAgentAction {
    name: String,
    scheduler: Arc<dyn Scheduler>,
    roles: HashMap<String, RoleConfig>,
    role_field: String,
}

impl SpawnAgentAction {
    pub fn new(name: impl Into<String>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self { name: name.into(), scheduler, roles: HashMap::new(), role_field: "role".to_string() }
    }

    /// Register a role's prompt/engine pair. `"Engineer"` is otherwise used
    /// as the default when an event names no role or an unknown one.
    pub fn with_role(mut self, role: impl Into<String>, config: RoleConfig) -> Self {
        self.roles.insert(role.into(), config);
        self
    }

    fn role_config(&self, role: &str) -> RoleConfig {
        self.roles.get(role).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Action for SpawnAgentAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_execute(&self, _event: &Event) -> bool {
        self.scheduler.stats().has_capacity()
    }

    async fn execute(&self, event: &Event) -> Result<ActionResult> {
        let role = event
            .get(&self.role_field)
            .and_then(|v| v.as_str())
            .unwrap_or("Engineer")
            .to_string();
        let config = self.role_config(&role);

        let mut context = event.payload.clone();
        context.insert("role".to_string(), json!(role));

        let task = SpawnTask { role: role.clone(), prompt: config.prompt_template, engine: config.engine, context };
        let session_id = self.scheduler.schedule(task).await?;
        Ok(ActionResult::success_result(json!({ "session_id": session_id.to_string(), "role": role })))
    }
}

#[cfg(test)]
#[path = "spawn_agent_tests.rs"]
mod tests;
