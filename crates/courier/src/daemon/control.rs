// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-file layout for the Courier daemon (§6): `<ctrl>/run/courier.{pid,json,lock}`,
//! `<ctrl>/log/courier.log`, `<ctrl>/courier/registry.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths every daemon lifecycle operation reads or writes, rooted at
/// `<project>/.weft`.
#[derive(Debug, Clone)]
pub struct ControlPaths {
    root: PathBuf,
}

impl ControlPaths {
    pub fn new(project_root: &Path) -> Self {
        Self { root: project_root.join(".weft") }
    }

    fn run_dir(&self) -> PathBuf {
        self.root.join("run")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.run_dir().join("courier.pid")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.run_dir().join("courier.lock")
    }

    pub fn state_path(&self) -> PathBuf {
        self.run_dir().join("courier.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join("log").join("courier.log")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("log")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join("courier").join("registry.json")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.run_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        if let Some(parent) = self.registry_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Runtime state written by a started daemon and read back by the CLI for
/// `status`/`stop` — host, port, pid, and when it came up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub pid: u32,
    pub host: String,
    pub port: u16,
    pub started_at: DateTime<Utc>,
}

impl RuntimeState {
    pub fn write(&self, paths: &ControlPaths) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self).unwrap_or_default();
        let tmp = paths.state_path().with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, paths.state_path())?;
        std::fs::write(paths.pid_path(), format!("{}\n", self.pid))
    }

    pub fn read(paths: &ControlPaths) -> Option<Self> {
        let raw = std::fs::read_to_string(paths.state_path()).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Coarse daemon lifecycle state reported by `status` (§4.K).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonStatus {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

weft_core::simple_display! {
    DaemonStatus {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Error => "error",
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
