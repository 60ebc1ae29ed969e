// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `send-notification` built-in action: one of a webhook JSON POST, a file
//! append, or a console line, with template substitution from the event
//! payload.

use super::substitute_template;
use crate::action::{Action, ActionResult};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use weft_bus::Event;
use weft_core::error::Result;

/// Where a notification is delivered.
pub enum NotifyTarget {
    Webhook { url: String },
    File { path: PathBuf },
    Console,
}

pub struct SendNotificationAction {
    name: String,
    target: NotifyTarget,
    message_template: String,
    client: reqwest::Client,
}

impl SendNotificationAction {
    pub fn new(name: impl Into<String>, target: NotifyTarget, message_template: impl Into<String>) -> Self {
        Self { name: name.into(), target, message_template: message_template.into(), client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Action for SendNotificationAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, event: &Event) -> Result<ActionResult> {
        let message = substitute_template(&self.message_template, &event.payload);

        match &self.target {
            NotifyTarget::Webhook { url } => {
                let response = self
                    .client
                    .post(url)
                    .json(&json!({ "text": message }))
                    .send()
                    .await
                    .map_err(|err| weft_core::error::Error::transient(format!("notify webhook request failed: {err}")))?;

                if response.status().as_u16() < 400 {
                    Ok(ActionResult::success_result(json!({ "target": "webhook", "status": response.status().as_u16() })))
                } else {
                    Ok(ActionResult::failure_result(format!("notify webhook returned {}", response.status())))
                }
            }
            NotifyTarget::File { path } => {
                let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
                file.write_all(format!("{message}\n").as_bytes()).await?;
                Ok(ActionResult::success_result(json!({ "target": "file", "path": path.display().to_string() })))
            }
            NotifyTarget::Console => {
                println!("{message}");
                Ok(ActionResult::success_result(json!({ "target": "console" })))
            }
        }
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
