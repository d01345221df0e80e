// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use thiserror::Error;

/// Errors from an external collaborator (§1: "explicitly out of scope —
/// external collaborators, interfaces only"). A Step Manager maps these
/// into a child-job failure.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request to {collaborator} failed: {message}")]
    RequestFailed { collaborator: &'static str, message: String },

    #[error("{collaborator} response could not be parsed: {message}")]
    InvalidResponse { collaborator: &'static str, message: String },

    #[error("{collaborator} rate limited the request")]
    RateLimited { collaborator: &'static str },
}
