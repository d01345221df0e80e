// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] joborc_storage::StorageError),

    #[error(transparent)]
    Runbook(#[from] joborc_runbook::RunbookError),

    #[error(transparent)]
    Core(#[from] joborc_core::CoreError),

    #[error(transparent)]
    Adapter(#[from] joborc_adapters::AdapterError),

    #[error("job status error: {0}")]
    JobStatus(#[from] joborc_core::JobStatusError),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("{0}")]
    Other(String),
}
