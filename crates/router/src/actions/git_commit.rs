// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `git commit` built-in action: stages, no-ops on a clean tree, commits
//! with a template-substituted message.

use super::subprocess::{run_with_timeout, GIT_COMMAND_TIMEOUT};
use super::substitute_template;
use crate::action::{Action, ActionResult};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use tokio::process::Command;
use weft_bus::Event;
use weft_core::error::Result;

/// Stage and commit, aborting quietly if the working tree has no changes.
pub struct GitCommitAction {
    name: String,
    repo_path: PathBuf,
    /// Files to stage; empty means `git add -A`.
    files: Vec<String>,
    message_template: String,
}

impl GitCommitAction {
    pub fn new(name: impl Into<String>, repo_path: impl Into<PathBuf>, message_template: impl Into<String>) -> Self {
        Self { name: name.into(), repo_path: repo_path.into(), files: Vec::new(), message_template: message_template.into() }
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    async fn git(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.repo_path);
        run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, "git commit").await
    }
}

#[async_trait]
impl Action for GitCommitAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, event: &Event) -> Result<ActionResult> {
        if self.files.is_empty() {
            self.git(&["add", "-A"]).await?;
        } else {
            let mut args = vec!["add"];
            args.extend(self.files.iter().map(String::as_str));
            self.git(&args).await?;
        }

        let status = self.git(&["status", "--porcelain"]).await?;
        if status.stdout.is_empty() {
            return Ok(ActionResult::success_result(json!({ "reason": "no_changes" })));
        }

        let message = substitute_template(&self.message_template, &event.payload);
        let commit_output = self.git(&["commit", "-m", &message]).await?;
        if !commit_output.status.success() {
            return Ok(ActionResult::failure_result(format!(
                "git commit failed: {}",
                String::from_utf8_lossy(&commit_output.stderr)
            )));
        }

        let hash_output = self.git(&["rev-parse", "HEAD"]).await?;
        let commit_hash = String::from_utf8_lossy(&hash_output.stdout).trim().to_string();
        Ok(ActionResult::success_result(json!({ "commit_hash": commit_hash })))
    }
}

#[cfg(test)]
#[path = "git_commit_tests.rs"]
mod tests;
