// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared subprocess-invocation helper for the git and test-runner actions.
//!
//! Every built-in action that shells out goes through here so timeout
//! handling and kill-on-timeout semantics live in one place.

use std::time::Duration;
use tokio::process::Command;
use weft_core::error::{Error, Result};

pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const TEST_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

/// Run `cmd` to completion, killing it if it outlives `timeout`.
pub async fn run_with_timeout(mut cmd: Command, timeout: Duration, label: &str) -> Result<std::process::Output> {
    let child = cmd.kill_on_drop(true).output();
    match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(Error::transient(format!("{label} failed to spawn: {err}"))),
        Err(_) => Err(Error::transient(format!("{label} timed out after {timeout:?}"))),
    }
}
