// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy.
//!
//! Every crate in the workspace composes its own `Error` enum around these
//! four kinds via `#[from]`, so a caller three layers up can still match on
//! [`ErrorKind`] without downcasting.

use thiserror::Error;

/// The four ways an operation in this workspace can fail.
///
/// `Transient` vs `Fatal` is the distinction callers care about most: a
/// transient error (lock contention, a file that moved mid-read) is worth
/// retrying; a fatal one (malformed config, a corrupt CAS shard) is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    Transient,
    Fatal,
}

crate::simple_display! {
    ErrorKind {
        InvalidInput => "invalid input",
        NotFound => "not found",
        Conflict => "conflict",
        Transient => "transient",
        Fatal => "fatal",
    }
}

/// Core error type shared by `weft-core` consumers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient failure: {0}")]
    Transient(String),

    #[error(transparent)]
    Fatal(#[from] anyhow::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Transient(_) => ErrorKind::Transient,
            Self::Fatal(_) | Self::Json(_) => ErrorKind::Fatal,
            Self::Io(_) => ErrorKind::Transient,
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
