// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side process lifecycle for the Courier daemon (§4.K): `start`,
//! `stop`, `kill`, `restart`, `get_status`, driven from the `weft courier`
//! CLI subcommands against a `courierd` binary.

use super::control::{ControlPaths, DaemonStatus, RuntimeState};
use fs2::FileExt;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use weft_core::error::{Error, Result};

/// How long `start` polls `/health` before giving up.
pub const SERVICE_START_TIMEOUT: Duration = Duration::from_secs(10);
/// Grace period after SIGTERM before `stop` escalates to SIGKILL.
pub const SIGTERM_TIMEOUT: Duration = Duration::from_secs(5);

/// Drives the daemon's process lifecycle for one project.
pub struct ProcessHandle {
    project_root: PathBuf,
    paths: ControlPaths,
    http: reqwest::Client,
}

impl ProcessHandle {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let project_root = project_root.into();
        let paths = ControlPaths::new(&project_root);
        Self { project_root, paths, http: reqwest::Client::new() }
    }

    pub fn paths(&self) -> &ControlPaths {
        &self.paths
    }

    fn pid_file_is_locked(&self) -> bool {
        let Ok(file) = std::fs::OpenOptions::new().read(true).write(true).create(true).open(self.paths.lock_path())
        else {
            return false;
        };
        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = file.unlock();
                false
            }
            Err(_) => true,
        }
    }

    async fn health_ok(&self, state: &RuntimeState) -> bool {
        self.http
            .get(format!("{}/health", state.base_url()))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false)
    }

    /// `get_status`: cross-check PID-file liveness against `/health`.
    pub async fn status(&self) -> DaemonStatus {
        let Some(state) = RuntimeState::read(&self.paths) else {
            return DaemonStatus::Stopped;
        };
        if !self.pid_file_is_locked() {
            return DaemonStatus::Stopped;
        }
        if self.health_ok(&state).await {
            DaemonStatus::Running
        } else {
            DaemonStatus::Error
        }
    }

    pub fn runtime_state(&self) -> Option<RuntimeState> {
        RuntimeState::read(&self.paths)
    }

    /// Start the daemon. `foreground` runs `courierd` inline (blocking on
    /// its exit status) rather than spawning and detaching.
    pub async fn start(&self, foreground: bool) -> Result<()> {
        if matches!(self.status().await, DaemonStatus::Running) {
            return Err(Error::conflict("courier daemon already running"));
        }
        self.paths.ensure_dirs().map_err(Error::from)?;
        let binary = find_courierd_binary();

        if foreground {
            let status = Command::new(&binary)
                .arg(&self.project_root)
                .status()
                .map_err(|err| Error::transient(format!("failed to launch courierd: {err}")))?;
            if !status.success() {
                return Err(Error::transient(format!("courierd exited with status {status}")));
            }
            return Ok(());
        }

        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.log_path())
            .map_err(Error::from)?;
        let log_file_err = log_file.try_clone().map_err(Error::from)?;
        Command::new(&binary)
            .arg(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(log_file_err))
            .spawn()
            .map_err(|err| Error::transient(format!("failed to spawn courierd: {err}")))?;

        self.wait_for_health(SERVICE_START_TIMEOUT).await
    }

    async fn wait_for_health(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(state) = RuntimeState::read(&self.paths) {
                if self.health_ok(&state).await {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(Error::transient("courier daemon did not become healthy in time"));
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// `stop(wait)`: SIGTERM, escalating to SIGKILL after [`SIGTERM_TIMEOUT`].
    /// Returns `false` if nothing was running.
    pub async fn stop(&self, wait: bool) -> Result<bool> {
        let Some(state) = RuntimeState::read(&self.paths) else {
            return Ok(false);
        };
        if !self.pid_file_is_locked() {
            self.cleanup_stale_state();
            return Ok(false);
        }

        let pid = Pid::from_raw(state.pid as i32);
        kill(pid, Signal::SIGTERM).map_err(|err| Error::transient(format!("SIGTERM failed: {err}")))?;

        if wait {
            let deadline = Instant::now() + SIGTERM_TIMEOUT;
            while self.pid_file_is_locked() {
                if Instant::now() >= deadline {
                    let _ = kill(pid, Signal::SIGKILL);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
        Ok(true)
    }

    /// `kill()`: SIGKILL unconditionally.
    pub fn kill(&self) -> Result<()> {
        if let Some(state) = RuntimeState::read(&self.paths) {
            let pid = Pid::from_raw(state.pid as i32);
            let _ = kill(pid, Signal::SIGKILL);
        }
        self.cleanup_stale_state();
        Ok(())
    }

    /// `restart(force)`: stop (or kill on `force`), then start.
    pub async fn restart(&self, force: bool) -> Result<()> {
        if force {
            self.kill()?;
        } else {
            self.stop(true).await?;
        }
        self.start(false).await
    }

    fn cleanup_stale_state(&self) {
        let _ = std::fs::remove_file(self.paths.pid_path());
        let _ = std::fs::remove_file(self.paths.state_path());
    }
}

fn find_courierd_binary() -> PathBuf {
    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let sibling = dir.join("courierd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("courierd")
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
