// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `git push` built-in action, with an optional `--force-with-lease`.

use super::subprocess::{run_with_timeout, GIT_COMMAND_TIMEOUT};
use crate::action::{Action, ActionResult};
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use tokio::process::Command;
use weft_bus::Event;
use weft_core::error::Result;

pub struct GitPushAction {
    name: String,
    repo_path: PathBuf,
    remote: String,
    branch: Option<String>,
    force_with_lease: bool,
}

impl GitPushAction {
    pub fn new(name: impl Into<String>, repo_path: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), repo_path: repo_path.into(), remote: "origin".to_string(), branch: None, force_with_lease: false }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_force_with_lease(mut self, force: bool) -> Self {
        self.force_with_lease = force;
        self
    }

    async fn git(&self, args: &[&str]) -> Result<std::process::Output> {
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.repo_path);
        run_with_timeout(cmd, GIT_COMMAND_TIMEOUT, "git push").await
    }

    async fn current_branch(&self) -> Result<String> {
        let output = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl Action for GitPushAction {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, _event: &Event) -> Result<ActionResult> {
        let branch = match &self.branch {
            Some(b) => b.clone(),
            None => self.current_branch().await?,
        };

        let mut args = vec!["push"];
        if self.force_with_lease {
            args.push("--force-with-lease");
        }
        args.push(&self.remote);
        args.push(&branch);

        let output = self.git(&args).await?;
        if output.status.success() {
            Ok(ActionResult::success_result(json!({ "remote": self.remote, "branch": branch })))
        } else {
            Ok(ActionResult::failure_result(format!("git push failed: {}", String::from_utf8_lossy(&output.stderr))))
        }
    }
}

#[cfg(test)]
#[path = "git_push_tests.rs"]
mod tests;
