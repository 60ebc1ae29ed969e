// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox directory layout and message file I/O.
//!
//! ```text
//! <root>/inbound/<provider>/*.md
//! <root>/outbound/<provider>/*.md
//! <root>/archive/<provider>/*.md
//! <root>/.deadletter/<provider>/*.md
//! <root>/.state/locks.json
//! ```
//!
//! Every write is temp-write-in-target-dir + rename; every move between
//! directories is an atomic rename, so a reader never observes a
//! partially-written or partially-moved file.

use crate::model::{Message, MessageId};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use weft_core::error::{Error, Result};

const INBOUND: &str = "inbound";
const OUTBOUND: &str = "outbound";
const ARCHIVE: &str = "archive";
const DEADLETTER: &str = ".deadletter";
const STATE: &str = ".state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mailroom {
    Inbound,
    Outbound,
    Archive,
    Deadletter,
}

impl Mailroom {
    fn dirname(self) -> &'static str {
        match self {
            Self::Inbound => INBOUND,
            Self::Outbound => OUTBOUND,
            Self::Archive => ARCHIVE,
            Self::Deadletter => DEADLETTER,
        }
    }
}

/// A parsed message together with the path it currently lives at.
#[derive(Debug, Clone)]
pub struct LocatedMessage {
    pub message: Message,
    pub path: PathBuf,
}

/// Filesystem-backed mailbox: message files plus the `.state/locks.json` side file.
#[derive(Debug, Clone)]
pub struct MailboxStore {
    root: PathBuf,
}

impl MailboxStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn shard_dir(&self, room: Mailroom, provider: &str) -> PathBuf {
        self.root.join(room.dirname()).join(provider)
    }

    pub fn locks_path(&self) -> PathBuf {
        self.root.join(STATE).join("locks.json")
    }

    /// Filename carrying a time-sortable prefix and the message id.
    fn filename_for(timestamp: chrono::DateTime<Utc>, id: &MessageId) -> String {
        format!("{}_{}.md", timestamp.format("%Y%m%dT%H%M%S"), id.as_str())
    }

    fn write_atomic(&self, dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let target = dir.join(filename);
        let tmp_path = dir.join(format!(".{filename}.tmp-{}", std::process::id()));
        let write_result = fs::write(&tmp_path, content.as_bytes());
        if let Err(err) = write_result {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::from(err));
        }
        fs::rename(&tmp_path, &target)?;
        Ok(target)
    }

    fn parse_file(path: &Path) -> Result<Message> {
        let raw = fs::read_to_string(path)?;
        let (mut message, body): (Message, String) = weft_core::frontmatter::parse(&raw)?;
        message.body = body;
        Ok(message)
    }

    fn render_file(message: &Message) -> Result<String> {
        weft_core::frontmatter::render(message, &message.body)
    }

    /// Atomically write a new message into `inbound/<provider>/`.
    pub fn create_inbound_atomic(&self, message: &Message) -> Result<PathBuf> {
        let dir = self.shard_dir(Mailroom::Inbound, &message.provider);
        let filename = Self::filename_for(message.timestamp, &message.id);
        let content = Self::render_file(message)?;
        self.write_atomic(&dir, &filename, &content)
    }

    /// Create a draft under `outbound/<provider>/` with a generated filename.
    pub fn create_outbound_draft(&self, message: &Message) -> Result<PathBuf> {
        let dir = self.shard_dir(Mailroom::Outbound, &message.provider);
        let filename = Self::filename_for(message.timestamp, &message.id);
        let content = Self::render_file(message)?;
        self.write_atomic(&dir, &filename, &content)
    }

    fn list_dir(&self, room: Mailroom, provider: Option<&str>) -> Result<Vec<LocatedMessage>> {
        let base = self.root.join(room.dirname());
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let provider_dirs: Vec<PathBuf> = match provider {
            Some(p) => vec![base.join(p)],
            None => fs::read_dir(&base)?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
        };

        for dir in provider_dirs {
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                if let Ok(message) = Self::parse_file(&path) {
                    out.push(LocatedMessage { message, path });
                }
            }
        }
        out.sort_by(|a, b| a.message.timestamp.cmp(&b.message.timestamp));
        Ok(out)
    }

    /// List inbound messages, optionally scoped to one provider.
    pub fn list_inbound(&self, provider: Option<&str>) -> Result<Vec<LocatedMessage>> {
        self.list_dir(Mailroom::Inbound, provider)
    }

    /// List outbound drafts, optionally scoped to one provider.
    pub fn list_outbound(&self, provider: Option<&str>) -> Result<Vec<LocatedMessage>> {
        self.list_dir(Mailroom::Outbound, provider)
    }

    /// Search inbound, then outbound, then archive for a message id.
    pub fn find_by_id(&self, id: &MessageId) -> Result<Option<LocatedMessage>> {
        for room in [Mailroom::Inbound, Mailroom::Outbound, Mailroom::Archive] {
            for located in self.list_dir(room, None)? {
                if &located.message.id == id {
                    return Ok(Some(located));
                }
            }
        }
        Ok(None)
    }

    /// Read-by-id: convenience wrapper returning just the parsed message.
    pub fn read_by_id(&self, id: &MessageId) -> Result<Option<Message>> {
        Ok(self.find_by_id(id)?.map(|l| l.message))
    }

    fn move_to(&self, located: &LocatedMessage, room: Mailroom) -> Result<PathBuf> {
        let dir = self.shard_dir(room, &located.message.provider);
        fs::create_dir_all(&dir)?;
        let filename = located
            .path
            .file_name()
            .ok_or_else(|| Error::invalid_input("message path has no filename"))?;
        let target = dir.join(filename);
        fs::rename(&located.path, &target)?;
        Ok(target)
    }

    /// Move a message to `archive/<provider>/`.
    pub fn archive(&self, located: &LocatedMessage) -> Result<PathBuf> {
        self.move_to(located, Mailroom::Archive)
    }

    /// Move a message to `.deadletter/<provider>/`.
    pub fn move_to_deadletter(&self, located: &LocatedMessage) -> Result<PathBuf> {
        self.move_to(located, Mailroom::Deadletter)
    }

    /// Read the raw lock table, or an empty map if no side file exists yet.
    pub fn get_locks(&self) -> Result<crate::model::LockTable> {
        let path = self.locks_path();
        if !path.is_file() {
            return Ok(crate::model::LockTable::new());
        }
        let raw = fs::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(crate::model::LockTable::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Persist the lock table atomically.
    pub fn save_locks(&self, table: &crate::model::LockTable) -> Result<()> {
        let dir = self.root.join(STATE);
        let content = serde_json::to_string_pretty(table)?;
        self.write_atomic(&dir, "locks.json", &content)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
