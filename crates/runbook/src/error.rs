// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use thiserror::Error;

/// Definitional errors (§7): surfaced at orchestration time, no job created.
#[derive(Debug, Error)]
pub enum RunbookError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("step {0:?} depends_on unknown step {1:?}")]
    UnknownDependency(String, String),

    #[error("cycle detected in depends_on, involving step {0:?}")]
    DependencyCycle(String),

    #[error("duplicate step name {0:?}")]
    DuplicateStepName(String),

    #[error("definition has no steps")]
    EmptySteps,
}
