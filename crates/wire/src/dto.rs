// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Wire types for the Read API (§6.3).

use std::collections::HashMap;

use joborc_core::{Counters, Job, JobId, JobStatus, JobType, LogEntry, LogLevel, Progress};
use serde::{Deserialize, Serialize};

/// One log line as returned by `GET /jobs/{id}/logs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntryDto {
    pub job_id: JobId,
    pub timestamp: String,
    pub full_timestamp: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
}

impl From<&LogEntry> for LogEntryDto {
    fn from(e: &LogEntry) -> Self {
        LogEntryDto {
            job_id: e.associated_job_id,
            timestamp: e.timestamp.clone(),
            full_timestamp: e.full_timestamp.clone(),
            level: e.level,
            message: e.message.clone(),
            context: e.context.clone(),
        }
    }
}

/// Per-job descriptive metadata keyed alongside a log page (§6.3:
/// `metadata{job_id: {name, url, depth, type, parent_id}}`). `url`/`depth`
/// are crawl-specific and pulled from `Job::config` when present; absent
/// for non-crawl job types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobLogMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub parent_id: Option<JobId>,
}

impl From<&Job> for JobLogMetadata {
    fn from(job: &Job) -> Self {
        JobLogMetadata {
            name: job.name.clone(),
            url: job.config.get("url").and_then(|v| v.as_str()).map(str::to_string),
            depth: job.config.get("depth").and_then(|v| v.as_u64()),
            job_type: job.job_type,
            parent_id: job.parent_id,
        }
    }
}

/// `GET /jobs/{id}/logs` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogsResponse {
    pub logs: Vec<LogEntryDto>,
    pub metadata: HashMap<JobId, JobLogMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Sort order requested on `GET /jobs/{id}/logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOrder {
    Asc,
    Desc,
}

impl Default for LogOrder {
    fn default() -> Self {
        LogOrder::Desc
    }
}

/// Query parameters accepted by `GET /jobs/{id}/logs`. Also constructed
/// client-side (`Serialize`) to build the query string for that request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub include_descendants: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default)]
    pub order: LogOrder,
}

/// `GET /jobs/{id}/status` response body — the job record with nested
/// counters, as named by §6.3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub id: JobId,
    pub parent_id: Option<JobId>,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub name: String,
    pub status: JobStatus,
    pub progress: Progress,
    pub counters: Counters,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    pub started_at_epoch_ms: Option<u64>,
    pub completed_at_epoch_ms: Option<u64>,
    pub error_message: Option<String>,
}

impl From<&Job> for JobStatusResponse {
    fn from(job: &Job) -> Self {
        JobStatusResponse {
            id: job.id,
            parent_id: job.parent_id,
            job_type: job.job_type,
            name: job.name.clone(),
            status: job.status,
            progress: job.progress,
            counters: job.counters,
            created_at_epoch_ms: job.created_at_epoch_ms,
            updated_at_epoch_ms: job.updated_at_epoch_ms,
            started_at_epoch_ms: job.started_at_epoch_ms,
            completed_at_epoch_ms: job.completed_at_epoch_ms,
            error_message: job.error_message.clone(),
        }
    }
}

/// One row of `GET /jobs?filter=…`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: JobId,
    #[serde(rename = "type")]
    pub job_type: JobType,
    pub name: String,
    pub status: JobStatus,
    pub progress: Progress,
    pub created_at_epoch_ms: u64,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        JobSummary {
            id: job.id,
            job_type: job.job_type,
            name: job.name.clone(),
            status: job.status,
            progress: job.progress,
            created_at_epoch_ms: job.created_at_epoch_ms,
        }
    }
}

/// Query parameters accepted by `GET /jobs?filter=…`. Also constructed
/// client-side (`Serialize`) to build the query string for that request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<JobType>,
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod tests;
