// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Messages exchanged over the daemon's local control socket (§3.5, §4.8):
//! today just "submit this definition", framed with [`crate::framing`].

use serde::{Deserialize, Serialize};

/// A request sent by a CLI client to the daemon's control socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Launch a [`joborc_runbook::JobDefinition`], given as source text —
    /// the daemon owns parsing so the wire format stays one frame.
    Submit { source: String },
}

/// The daemon's reply to a [`ControlRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlResponse {
    Submitted { root_id: String },
    Error { message: String },
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
