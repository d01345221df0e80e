// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Resolve state directory: `JOBORC_STATE_DIR` > `XDG_STATE_HOME/joborc` >
/// `~/.local/state/joborc`.
pub fn state_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("JOBORC_STATE_DIR") {
        return Some(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Some(PathBuf::from(xdg).join("joborc"));
    }
    dirs::home_dir().map(|home| home.join(".local/state/joborc"))
}

/// Path to the TOML config file, if one should be loaded:
/// `JOBORC_CONFIG` if set, else `<state_dir>/config.toml`.
pub fn config_path(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("JOBORC_CONFIG").map(PathBuf::from).unwrap_or_else(|_| state_dir.join("config.toml"))
}

/// HTTP read API bind address (default `127.0.0.1:7878`).
pub fn http_addr() -> String {
    std::env::var("JOBORC_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:7878".to_string())
}

/// Path to the local control socket: `JOBORC_SOCKET` if set, else
/// `<state_dir>/control.sock`.
pub fn socket_path(state_dir: &std::path::Path) -> PathBuf {
    std::env::var("JOBORC_SOCKET").map(PathBuf::from).unwrap_or_else(|_| state_dir.join("control.sock"))
}
