// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow unwrap/expect in test code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The Courier daemon: an HTTP API (§4.J) and background process (§4.K)
//! over the mailbox's claim/lease lock manager, the project registry, and
//! DingTalk-style webhook signature verification.

pub mod config;
pub mod daemon;
pub mod http;
pub mod registry;
pub mod signature;

pub use config::WeftConfig;
pub use daemon::{ControlPaths, DaemonStatus, MainLoop, OutboundAdapter, ProcessHandle, RuntimeState};
pub use http::{build_router, AppState};
pub use registry::{ProjectRegistry, RegisteredProject};
