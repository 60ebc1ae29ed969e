// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the shared [`weft_core::error::Error`] taxonomy onto the HTTP error
//! envelope and status codes from §4.J/§7, in one `IntoResponse` impl rather
//! than scattering status codes at each handler call site.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use weft_core::error::Error;

/// The HTTP error envelope: a status, a short machine code, and a message.
///
/// Built either from a [`weft_core::error::Error`] via `classify` (covering
/// the five core error kinds) or directly for the one code the core
/// taxonomy doesn't carry — 401 `unauthorized` on webhook signature failure.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    claimed_by: Option<String>,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, code: "unauthorized", message: message.into(), claimed_by: None }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = classify(&err);
        let claimed_by = claimed_by_from(&err);
        Self { status, code, message: err.to_string(), claimed_by }
    }
}

/// `(status, error_code)` for one [`Error`], per §4.J's error table.
///
/// A `Conflict` is split further by its message prefix: `already_claimed:`
/// (409, set by [`weft_mailbox::lock::LockManager::claim`]) vs
/// `claimed_by_other:` (403, set by the complete/fail ownership guard).
fn classify(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_body"),
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        Error::Conflict(msg) if msg.starts_with("claimed_by_other:") => {
            (StatusCode::FORBIDDEN, "claimed_by_other")
        }
        Error::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        Error::Transient(_) | Error::Fatal(_) | Error::Io(_) | Error::Json(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

/// Pull `claimed_by` out of a `already_claimed:<agent>` / `claimed_by_other:<agent>`
/// conflict message, if present.
pub fn claimed_by_from(err: &Error) -> Option<String> {
    match err {
        Error::Conflict(msg) => msg
            .split_once("already_claimed:")
            .or_else(|| msg.split_once("claimed_by_other:"))
            .map(|(_, rest)| rest.to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.code,
            "message": self.message,
        });
        if let Some(claimed_by) = self.claimed_by {
            body["claimed_by"] = json!(claimed_by);
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
