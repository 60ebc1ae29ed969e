// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Courier HTTP API (§4.J): a REST surface over the lock manager, the
//! mailbox store, and the project registry.

pub mod error;
mod handlers;

use crate::registry::ProjectRegistry;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use weft_mailbox::MessageStateManager;

/// Shared state every handler closes over.
#[derive(Clone)]
pub struct AppState {
    pub state_manager: Arc<MessageStateManager>,
    pub registry: Arc<ProjectRegistry>,
    pub started_at: DateTime<Utc>,
    pub adapters: Vec<String>,
    pub webhook_window_secs: i64,
}

impl AppState {
    pub fn new(state_manager: Arc<MessageStateManager>, registry: Arc<ProjectRegistry>) -> Self {
        Self {
            state_manager,
            registry,
            started_at: Utc::now(),
            adapters: Vec::new(),
            webhook_window_secs: crate::signature::DEFAULT_WINDOW_SECS,
        }
    }

    pub fn with_adapters(mut self, adapters: Vec<String>) -> Self {
        self.adapters = adapters;
        self
    }
}

/// Build the full router, mounting the message/webhook/registry routes
/// under `prefix` and `/health` at the root.
pub fn build_router(prefix: &str, state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(&format!("{prefix}/messages/:id"), get(handlers::get_message))
        .route(&format!("{prefix}/messages/:id/claim"), post(handlers::claim_message))
        .route(&format!("{prefix}/messages/:id/complete"), post(handlers::complete_message))
        .route(&format!("{prefix}/messages/:id/fail"), post(handlers::fail_message))
        .route(&format!("{prefix}/webhook/dingtalk/:slug"), post(handlers::dingtalk_webhook))
        .route(&format!("{prefix}/registry/register"), post(handlers::register_project))
        .route(&format!("{prefix}/registry/list"), post(handlers::list_projects))
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
