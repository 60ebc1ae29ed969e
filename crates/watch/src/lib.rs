// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow unwrap/expect in test code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Polling filesystem watchers that reduce raw file state into semantic
//! change events and publish them onto the shared event bus.
//!
//! [`scanner`] owns the tick-to-tick file state diff; [`watcher`] owns the
//! poll loop and lifecycle; the leaf modules ([`issue`], [`memo`], [`task`],
//! [`mailbox`]) each extract domain meaning from one kind of watched file.

pub mod config;
pub mod file_event;
pub mod issue;
pub mod mailbox;
pub mod memo;
pub mod scanner;
pub mod task;
pub mod watcher;

pub use config::WatchConfig;
pub use file_event::{ChangeType, FieldChange, FileEvent};
pub use watcher::{PollingWatcher, SemanticWatcher};
