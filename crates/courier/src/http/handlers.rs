// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler bodies for every route in [`super::build_router`].

use super::error::ApiError;
use super::AppState;
use crate::signature;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use weft_core::error::Error;
use weft_mailbox::MessageId;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "adapters": state.adapters,
        "metrics": { "uptime_secs": uptime_secs },
    }))
}

fn parse_message_id(raw: &str) -> MessageId {
    MessageId::from_string(raw)
}

fn require_message(state: &AppState, id: &MessageId) -> Result<(), ApiError> {
    let found = state.state_manager.store().find_by_id(id)?;
    if found.is_none() {
        return Err(Error::not_found(format!("no message {id}")).into());
    }
    Ok(())
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let message_id = parse_message_id(&id);
    require_message(&state, &message_id)?;
    let lock = state.state_manager.locks().get_status(&message_id);
    let status = lock.as_ref().map(|l| l.status.to_string()).unwrap_or_else(|| "new".to_string());
    Ok(Json(json!({
        "success": true,
        "message_id": message_id.to_string(),
        "status": status,
        "lock": lock,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub agent_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout: i64,
}

fn default_timeout_secs() -> i64 {
    300
}

pub async fn claim_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<Value>, ApiError> {
    let message_id = parse_message_id(&id);
    require_message(&state, &message_id)?;
    let lock = state.state_manager.claim(&message_id, &req.agent_id, req.timeout)?;
    Ok(Json(json!({ "success": true, "message_id": message_id.to_string(), "lock": lock })))
}

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub agent_id: String,
}

pub async fn complete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AgentRequest>,
) -> Result<Json<Value>, ApiError> {
    let message_id = parse_message_id(&id);
    let (lock, archived_path) = state.state_manager.complete(&message_id, &req.agent_id)?;
    Ok(Json(json!({
        "success": true,
        "message_id": message_id.to_string(),
        "status": lock.status.to_string(),
        "archived_path": archived_path.map(|p| p.display().to_string()),
    })))
}

#[derive(Debug, Deserialize)]
pub struct FailRequest {
    pub agent_id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default = "default_retryable")]
    pub retryable: bool,
}

fn default_retryable() -> bool {
    true
}

pub async fn fail_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<FailRequest>,
) -> Result<Json<Value>, ApiError> {
    let message_id = parse_message_id(&id);
    let reason = req.reason.unwrap_or_else(|| "unspecified".to_string());
    let (lock, deadletter_path) = state.state_manager.fail(&message_id, &req.agent_id, &reason, req.retryable)?;
    Ok(Json(json!({
        "success": true,
        "message_id": message_id.to_string(),
        "status": lock.status.to_string(),
        "deadletter_path": deadletter_path.map(|p| p.display().to_string()),
    })))
}

#[derive(Debug, Deserialize)]
pub struct WebhookQuery {
    pub timestamp: i64,
    pub sign: String,
}

pub async fn dingtalk_webhook(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<WebhookQuery>,
    Json(_body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let project = state
        .registry
        .get(&slug)
        .ok_or_else(|| Error::not_found(format!("unknown project slug {slug}")))?;

    if let Some(secret) = project.webhook_secret() {
        let ok = signature::verify(secret, query.timestamp, &query.sign, Utc::now(), state.webhook_window_secs);
        if !ok {
            return Err(ApiError::unauthorized("webhook signature verification failed"));
        }
    }

    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub slug: String,
    pub path: std::path::PathBuf,
    #[serde(default)]
    pub config: Value,
}

pub async fn register_project(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let project = state.registry.register(&req.slug, req.path, req.config)?;
    Ok(Json(json!({ "success": true, "slug": project.slug, "path": project.path })))
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Value> {
    let projects = state.registry.list();
    Json(json!({ "success": true, "projects": projects }))
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
