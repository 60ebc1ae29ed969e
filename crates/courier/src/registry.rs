// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project registry: the slug → project-path table backing the
//! `/registry/register` and `/registry/list` endpoints (§4.J), persisted to
//! `<ctrl>/courier/registry.json`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use weft_core::error::Result;

/// A project registered with the Courier daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredProject {
    pub slug: String,
    pub path: PathBuf,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl RegisteredProject {
    /// The per-slug webhook secret, if the registration's `config` carries
    /// a `webhook_secret` string (§4.J signature verification).
    pub fn webhook_secret(&self) -> Option<&str> {
        self.config.get("webhook_secret").and_then(|v| v.as_str())
    }
}

type Table = BTreeMap<String, RegisteredProject>;

/// In-memory registry of known projects, mirrored to `registry.json`.
pub struct ProjectRegistry {
    path: PathBuf,
    inner: Mutex<Table>,
}

impl ProjectRegistry {
    /// Load the registry from `path`, or start empty if it does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table: Table = if path.is_file() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Table::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Table::new()
        };
        Ok(Self { path, inner: Mutex::new(table) })
    }

    fn persist(&self, table: &Table) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Register (or overwrite) a project under `slug`.
    pub fn register(&self, slug: &str, path: PathBuf, config: serde_json::Value) -> Result<RegisteredProject> {
        let project = RegisteredProject { slug: slug.to_string(), path, config };
        let mut table = self.inner.lock();
        table.insert(slug.to_string(), project.clone());
        self.persist(&table)?;
        Ok(project)
    }

    pub fn get(&self, slug: &str) -> Option<RegisteredProject> {
        self.inner.lock().get(slug).cloned()
    }

    /// All registered projects, ordered by slug.
    pub fn list(&self) -> Vec<RegisteredProject> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn registry_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
