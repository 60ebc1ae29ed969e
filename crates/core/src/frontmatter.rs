// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frontmatter parsing and writing for mailbox message files.
//!
//! A message file is a fenced metadata block followed by a free-form body:
//!
//! ```text
//! ---
//! id = "msg-abc"
//! provider = "dingtalk"
//! ---
//! the message body
//! ```
//!
//! Metadata is TOML rather than YAML so the on-disk format shares a parser
//! with [`crate::config`]-style files elsewhere in the workspace.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

const FENCE: &str = "---";

/// Split `content` into its metadata block and body.
///
/// Returns `Ok(None)` (not an error) when the content has no recognizable
/// frontmatter fence, mirroring a plain file with no metadata at all.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = content.strip_prefix(FENCE)?;
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let end = rest.find(&format!("\n{FENCE}\n")).or_else(|| {
        // tolerate a fence on the final line with no trailing newline
        rest.strip_suffix(FENCE).map(|_| rest.len() - FENCE.len() - 1)
    })?;
    let meta = &rest[..end];
    let body = &rest[end + 1 + FENCE.len()..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some((meta, body))
}

/// Parse a frontmatter file into typed metadata plus the raw body text.
pub fn parse<T: DeserializeOwned>(content: &str) -> Result<(T, String)> {
    let (meta, body) = split(content)
        .ok_or_else(|| Error::invalid_input("missing frontmatter fence"))?;
    let metadata: T = toml::from_str(meta)
        .map_err(|e| Error::invalid_input(format!("invalid frontmatter: {e}")))?;
    Ok((metadata, body.to_string()))
}

/// Render typed metadata and a body back into frontmatter file content.
pub fn render<T: Serialize>(metadata: &T, body: &str) -> Result<String> {
    let meta = toml::to_string(metadata)
        .map_err(|e| Error::invalid_input(format!("cannot serialize frontmatter: {e}")))?;
    Ok(format!("{FENCE}\n{meta}{FENCE}\n{body}"))
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
