// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One poll tick: scan the watched tree, diff against the prior snapshot,
//! and emit raw [`FileEvent`]s for created/modified/deleted paths.

use crate::config::WatchConfig;
use crate::file_event::{ChangeType, FileEvent};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use weft_core::error::Result;

/// Everything recorded about one file at the moment it was scanned.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub modified: SystemTime,
    pub size: u64,
    pub content: String,
    pub content_hash: String,
}

/// A point-in-time snapshot of every file under a [`WatchConfig`].
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub files: HashMap<PathBuf, FileRecord>,
}

/// Scan `config.path` honoring include/exclude globs and recursion, building
/// a fresh [`Snapshot`]. Only UTF-8-readable files are recorded; binary or
/// unreadable files are silently skipped (this is a text-oriented pipeline).
pub fn scan(config: &WatchConfig) -> Result<Snapshot> {
    let mut files = HashMap::new();
    if config.path.is_dir() {
        walk(&config.path, &config.path, config, &mut files)?;
    } else if config.path.is_file() {
        if let Some(record) = read_record(&config.path) {
            files.insert(config.path.clone(), record);
        }
    }
    Ok(Snapshot { files })
}

fn walk(
    root: &Path,
    dir: &Path,
    config: &WatchConfig,
    out: &mut HashMap<PathBuf, FileRecord>,
) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };
    for entry in entries {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else { continue };

        if file_type.is_dir() {
            if config.recursive {
                walk(root, &path, config, out)?;
            }
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(&path);
        if !config.matches(relative) {
            continue;
        }
        if let Some(record) = read_record(&path) {
            out.insert(path, record);
        }
    }
    Ok(())
}

fn read_record(path: &Path) -> Option<FileRecord> {
    let meta = fs::metadata(path).ok()?;
    let content = fs::read_to_string(path).ok()?;
    let content_hash = hex::encode(Sha256::digest(content.as_bytes()));
    Some(FileRecord {
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        size: meta.len(),
        content,
        content_hash,
    })
}

/// Diff `previous` against `current`, emitting raw created/modified/deleted
/// events in a stable order: new paths, then modified paths, then deletions.
pub fn diff(watcher_name: &str, previous: &Snapshot, current: &Snapshot) -> Vec<FileEvent> {
    let mut events = Vec::new();

    let mut new_paths: Vec<&PathBuf> =
        current.files.keys().filter(|p| !previous.files.contains_key(*p)).collect();
    new_paths.sort();
    for path in new_paths {
        let record = &current.files[path];
        events.push(
            FileEvent::new(path.clone(), ChangeType::Created, watcher_name)
                .new_content(record.content.clone()),
        );
    }

    let mut changed_paths: Vec<&PathBuf> = current
        .files
        .keys()
        .filter(|p| {
            previous
                .files
                .get(*p)
                .map(|old| old.content_hash != current.files[*p].content_hash)
                .unwrap_or(false)
        })
        .collect();
    changed_paths.sort();
    for path in changed_paths {
        let old = &previous.files[path];
        let new = &current.files[path];
        events.push(
            FileEvent::new(path.clone(), ChangeType::Modified, watcher_name)
                .old_content(old.content.clone())
                .new_content(new.content.clone()),
        );
    }

    let mut missing_paths: Vec<&PathBuf> =
        previous.files.keys().filter(|p| !current.files.contains_key(*p)).collect();
    missing_paths.sort();
    for path in missing_paths {
        let record = &previous.files[path];
        events.push(
            FileEvent::new(path.clone(), ChangeType::Deleted, watcher_name)
                .old_content(record.content.clone()),
        );
    }

    events
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
