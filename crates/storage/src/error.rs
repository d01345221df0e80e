// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use joborc_core::JobId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    #[error("queue item not found: {0}")]
    MessageNotFound(String),

    #[error("transient storage error: {0}")]
    Transient(String),
}
