// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Shared error taxonomy (§7). Each downstream crate defines its own
//! `thiserror` enum for crate-local failure modes; `CoreError` covers the
//! data-model-level failures that `joborc-core` itself can produce.

use crate::job::JobStatusError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    JobStatus(#[from] JobStatusError),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("malformed cursor: {0}")]
    MalformedCursor(String),
}
