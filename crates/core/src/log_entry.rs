// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Persistent log entry type and its monotonic sequence key (§3.3).

use crate::job::JobId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// 3-letter level code (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trc,
    Dbg,
    Inf,
    War,
    Err,
    Ftl,
    Pnc,
}

crate::simple_display! {
    LogLevel {
        Trc => "TRC",
        Dbg => "DBG",
        Inf => "INF",
        War => "WAR",
        Err => "ERR",
        Ftl => "FTL",
        Pnc => "PNC",
    }
}

impl LogLevel {
    /// Maps a conventional integer log level (as emitted by a `tracing`
    /// subscriber) to its 3-letter code. Unknown/out-of-range values map to
    /// `Inf`, matching the Log Consumer's "best-effort" transform step (§4.2.2).
    pub fn from_tracing_level(level: tracing_level_compat::Level) -> Self {
        match level {
            tracing_level_compat::Level::Trace => LogLevel::Trc,
            tracing_level_compat::Level::Debug => LogLevel::Dbg,
            tracing_level_compat::Level::Info => LogLevel::Inf,
            tracing_level_compat::Level::Warn => LogLevel::War,
            tracing_level_compat::Level::Error => LogLevel::Err,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TRC" => Some(LogLevel::Trc),
            "DBG" => Some(LogLevel::Dbg),
            "INF" => Some(LogLevel::Inf),
            "WAR" => Some(LogLevel::War),
            "ERR" => Some(LogLevel::Err),
            "FTL" => Some(LogLevel::Ftl),
            "PNC" => Some(LogLevel::Pnc),
            _ => None,
        }
    }
}

/// Minimal stand-in for `tracing::Level` so this crate doesn't have to pull
/// in `tracing` just for the five standard severities; `joborc-engine`'s
/// log consumer maps the real `tracing::Level` into this at the boundary.
pub mod tracing_level_compat {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Trace,
        Debug,
        Info,
        Warn,
        Error,
    }
}

/// Process-wide monotonic counter used as the tie-breaker in [`Sequence::new`]
/// so that two entries written within the same nanosecond still sort in
/// write order (§3.3: "lexicographic order equals chronological order even
/// when timestamps collide").
static SEQUENCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `"<rfc3339nano-timestamp>_<monotonic-counter>"`. Lexicographic order
/// equals chronological write order (§3.3, §8 property 3).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence(pub String);

impl Sequence {
    /// Mint the next sequence value for an entry whose RFC3339-nanosecond
    /// timestamp is `full_timestamp`. Monotonic within the process: even if
    /// two entries share a timestamp, their counters differ so string
    /// comparison still orders them by write order.
    pub fn next(full_timestamp: &str) -> Self {
        let counter = SEQUENCE_COUNTER.fetch_add(1, Ordering::SeqCst);
        Sequence(format!("{full_timestamp}_{counter:020}"))
    }
}

/// A persisted log entry (§3.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub associated_job_id: JobId,
    pub sequence: Sequence,
    pub full_timestamp: String,
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    pub context: HashMap<String, String>,
}

impl LogEntry {
    /// Sort key used by aggregation's k-way merge (§4.3.6): primary is
    /// `sequence`, tie-break is `full_timestamp` then `job_id`.
    pub fn sort_key(&self) -> (&str, &str, &str) {
        (&self.sequence.0, &self.full_timestamp, self.associated_job_id.as_str())
    }
}

#[cfg(test)]
#[path = "log_entry_tests.rs"]
mod tests;
