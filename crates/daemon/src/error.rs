// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use thiserror::Error;

/// Daemon-level errors: configuration, startup, and HTTP wiring. Per-crate
/// error enums (`EngineError`, `StorageError`, `ReadApiError`) are wrapped
/// rather than re-derived (§ ambient stack "error handling").
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config at {path}: {source}")]
    InvalidConfig { path: std::path::PathBuf, source: toml::de::Error },

    #[error(transparent)]
    Engine(#[from] joborc_engine::EngineError),
}
