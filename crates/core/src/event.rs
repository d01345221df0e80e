// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Event types published on the in-process Event Bus (§3.4, §6.2).
//!
//! Events are ephemeral — never persisted. `log_event` is the one
//! exception that carries persisted data (a [`crate::LogEntry`]), but the
//! event itself is still not stored; only the Log Consumer's write to
//! `LogStorage` is durable.

use crate::job::{Counters, JobId, JobStatus};
use crate::log_entry::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Events that drive UI updates and the Status Service.
///
/// Serializes with `{"type": "job_created", ...fields}` format, matching
/// the wire shape in §6.2's event table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "job_created")]
    JobCreated {
        job_id: JobId,
        job_type: String,
        parent_id: Option<JobId>,
    },

    #[serde(rename = "job_started")]
    JobStarted { job_id: JobId, started_at_epoch_ms: u64 },

    #[serde(rename = "job_completed")]
    JobCompleted {
        job_id: JobId,
        #[serde(default)]
        result: HashMap<String, serde_json::Value>,
    },

    #[serde(rename = "job_failed")]
    JobFailed { job_id: JobId, error: String },

    #[serde(rename = "job_cancelled")]
    JobCancelled { job_id: JobId },

    #[serde(rename = "job_spawn")]
    JobSpawn {
        parent_job_id: JobId,
        child_job_id: JobId,
        discovered_by: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<u32>,
    },

    #[serde(rename = "job_progress")]
    JobProgress {
        job_id: JobId,
        current: u64,
        total: u64,
        counters: Counters,
    },

    #[serde(rename = "log_event")]
    LogEvent {
        job_id: JobId,
        level: LogLevel,
        message: String,
        timestamp: String,
        #[serde(default)]
        context: HashMap<String, String>,
    },

    #[serde(rename = "status_changed")]
    StatusChanged {
        state: String,
        #[serde(default)]
        metadata: HashMap<String, serde_json::Value>,
    },

    /// Unknown type tags deserialize here rather than failing, matching the
    /// teacher's `Event` deserialization posture for forward compatibility.
    #[serde(other)]
    Custom,
}

impl Event {
    /// The `type` discriminant string, exactly as it appears on the wire.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::JobCreated { .. } => "job_created",
            Event::JobStarted { .. } => "job_started",
            Event::JobCompleted { .. } => "job_completed",
            Event::JobFailed { .. } => "job_failed",
            Event::JobCancelled { .. } => "job_cancelled",
            Event::JobSpawn { .. } => "job_spawn",
            Event::JobProgress { .. } => "job_progress",
            Event::LogEvent { .. } => "log_event",
            Event::StatusChanged { .. } => "status_changed",
            Event::Custom => "custom",
        }
    }

    /// Build the appropriate lifecycle event for a job status transition,
    /// or `None` for `Pending` (no event defined for that transition).
    pub fn for_status_transition(
        job_id: JobId,
        status: JobStatus,
        now_ms: u64,
        error: Option<&str>,
        result: HashMap<String, serde_json::Value>,
    ) -> Option<Event> {
        match status {
            JobStatus::Pending => None,
            JobStatus::Running => Some(Event::JobStarted { job_id, started_at_epoch_ms: now_ms }),
            JobStatus::Completed => Some(Event::JobCompleted { job_id, result }),
            JobStatus::Failed => {
                Some(Event::JobFailed { job_id, error: error.unwrap_or_default().to_string() })
            }
            JobStatus::Cancelled => Some(Event::JobCancelled { job_id }),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
