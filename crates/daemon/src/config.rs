// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Daemon configuration (§6.4, ambient stack "Configuration"): resolves the
//! ambient paths the way the teacher's own `Config::load` does (state dir
//! under `$XDG_STATE_HOME` or `~/.local/state`), then layers the
//! `logging`/`queue`/`jobs` sections from a TOML file over their spec
//! defaults.

use std::path::PathBuf;

use joborc_core::config::{JobsConfig, LoggingConfig, QueueConfig};
use serde::Deserialize;

use crate::error::DaemonError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    logging: LoggingConfig,
    queue: QueueConfig,
    jobs: JobsConfig,
}

/// Daemon configuration: ambient paths plus the spec's recognized options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. `~/.local/state/joborc`).
    pub state_dir: PathBuf,
    /// Path to the daemon's own process log file.
    pub log_path: PathBuf,
    /// Bind address for the read API (§6.3).
    pub http_addr: String,
    /// Path to the local control socket (§3.5, §4.8).
    pub socket_path: PathBuf,
    pub logging: LoggingConfig,
    pub queue: QueueConfig,
    pub jobs: JobsConfig,
}

impl Config {
    /// Loads configuration for the daemon. Ambient paths are always
    /// resolved; the `logging`/`queue`/`jobs` sections come from a TOML
    /// file at `config_path` if present, else their spec defaults.
    pub fn load() -> Result<Self, DaemonError> {
        let state_dir = crate::env::state_dir().ok_or(DaemonError::NoStateDir)?;
        let config_path = crate::env::config_path(&state_dir);

        let file_config = match std::fs::read_to_string(&config_path) {
            Ok(text) => toml::from_str(&text).map_err(|source| DaemonError::InvalidConfig { path: config_path.clone(), source })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(err) => return Err(DaemonError::Io(err)),
        };

        Ok(Self {
            log_path: state_dir.join("daemon.log"),
            http_addr: crate::env::http_addr(),
            socket_path: crate::env::socket_path(&state_dir),
            logging: file_config.logging,
            queue: file_config.queue,
            jobs: file_config.jobs,
            state_dir,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
