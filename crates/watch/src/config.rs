// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watch configuration: path, glob filters, recursion, poll cadence.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a single [`crate::watcher::PollingWatcher`].
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub path: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub poll_interval: Duration,
}

impl WatchConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include: vec!["*".to_string()],
            exclude: Vec::new(),
            recursive: true,
            poll_interval: Duration::from_secs(2),
        }
    }

    weft_core::setters! {
        set { recursive: bool }
        set { poll_interval: Duration }
    }

    pub fn include(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `path`, relative to [`Self::path`], should be scanned.
    pub fn matches(&self, relative: &Path) -> bool {
        let name = relative.to_string_lossy();
        let included = self.include.iter().any(|p| glob_match(p, &name));
        let excluded = self.exclude.iter().any(|p| glob_match(p, &name));
        included && !excluded
    }
}

/// Minimal `*`/`?` glob matcher sufficient for single-segment filename
/// patterns like `*.md` or `issue-*.toml`. Does not support `**`.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn helper(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                helper(&p[1..], t) || (!t.is_empty() && helper(p, &t[1..]))
            }
            (Some(b'?'), Some(_)) => helper(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => helper(&p[1..], &t[1..]),
            _ => false,
        }
    }
    helper(pattern.as_bytes(), text.as_bytes())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
