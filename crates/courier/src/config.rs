// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `WeftConfig`: compiled-in defaults, layered with `<project>/.weft/config.toml`
//! and `WEFT_*` environment overrides (§10.2). A malformed config file is a
//! *Fatal* error surfaced at startup, never silently ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use weft_core::error::{Error, Result};

/// Relative path of the project-local config file.
pub const CONFIG_RELATIVE_PATH: &str = ".weft/config.toml";

/// Default bind address for the Courier HTTP API (§6).
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8644;
pub const DEFAULT_PREFIX: &str = "/api/v1/courier";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftConfig {
    pub store_root: PathBuf,
    pub mailbox_root: PathBuf,
    pub courier_host: String,
    pub courier_port: u16,
    pub courier_prefix: String,
    pub poll_interval_ms: u64,
    pub outbound_drain_interval_ms: u64,
    pub retry_scan_interval_ms: u64,
    pub expiry_sweep_interval_ms: u64,
}

impl Default for WeftConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from(".weft/store"),
            mailbox_root: PathBuf::from(".weft/mailbox"),
            courier_host: DEFAULT_HOST.to_string(),
            courier_port: DEFAULT_PORT,
            courier_prefix: DEFAULT_PREFIX.to_string(),
            poll_interval_ms: 2_000,
            outbound_drain_interval_ms: 2_000,
            retry_scan_interval_ms: 5_000,
            expiry_sweep_interval_ms: 30_000,
        }
    }
}

impl WeftConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn outbound_drain_interval(&self) -> Duration {
        Duration::from_millis(self.outbound_drain_interval_ms)
    }

    pub fn retry_scan_interval(&self) -> Duration {
        Duration::from_millis(self.retry_scan_interval_ms)
    }

    pub fn expiry_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.expiry_sweep_interval_ms)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.courier_host, self.courier_port)
    }

    /// Layer compiled-in defaults, `<project>/.weft/config.toml` (if
    /// present), then `WEFT_*` environment variables. Malformed TOML is a
    /// `Fatal` error (§7), never silently dropped.
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.store_root = project_root.join(".weft/store");
        config.mailbox_root = project_root.join(".weft/mailbox");

        let config_path = project_root.join(CONFIG_RELATIVE_PATH);
        if config_path.is_file() {
            let raw = std::fs::read_to_string(&config_path)?;
            config = toml::from_str(&raw).map_err(|err| {
                Error::Fatal(anyhow::anyhow!("malformed config at {}: {err}", config_path.display()))
            })?;
            if config.store_root.is_relative() {
                config.store_root = project_root.join(&config.store_root);
            }
            if config.mailbox_root.is_relative() {
                config.mailbox_root = project_root.join(&config.mailbox_root);
            }
        }

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("WEFT_COURIER_HOST") {
            self.courier_host = v;
        }
        if let Ok(v) = std::env::var("WEFT_COURIER_PORT") {
            if let Ok(port) = v.parse() {
                self.courier_port = port;
            }
        }
        if let Ok(v) = std::env::var("WEFT_STORE_ROOT") {
            self.store_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("WEFT_MAILBOX_ROOT") {
            self.mailbox_root = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("WEFT_POLL_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.poll_interval_ms = ms;
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
