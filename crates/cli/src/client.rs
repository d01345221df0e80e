// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client for CLI commands: a Unix-socket connection for submitting
//! Job Definitions, and an HTTP client for the read-only Read API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use joborc_wire::{ControlRequest, ControlResponse, JobListQuery, JobStatusResponse, JobSummary, LogsQuery, LogsResponse, ProtocolError};
use thiserror::Error;
use tokio::net::UnixStream;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

/// Timeout for a single control-socket round trip.
pub fn timeout_ipc() -> Duration {
    parse_duration_ms("JOBORC_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(5))
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("definition rejected: {0}")]
    Rejected(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out")]
    Timeout,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("daemon returned {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
}

/// Client for the daemon's local control socket (submission only).
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to the daemon's control socket. No auto-start: the daemon is
    /// a separately managed process (`joborcd`).
    pub fn connect(socket_path: &Path) -> Result<Self, ClientError> {
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path.to_path_buf()));
        }
        Ok(Self { socket_path: socket_path.to_path_buf() })
    }

    /// Submit a Job Definition's HCL source, returning its root job id.
    pub async fn submit(&self, source: String) -> Result<String, ClientError> {
        let request = ControlRequest::Submit { source };
        let timeout = timeout_ipc();

        let mut stream = UnixStream::connect(&self.socket_path).await?;
        let bytes = joborc_wire::encode(&request)?;
        tokio::time::timeout(timeout, joborc_wire::write_message(&mut stream, &bytes)).await.map_err(|_| ClientError::Timeout)??;

        let response_bytes = tokio::time::timeout(timeout, joborc_wire::read_message(&mut stream)).await.map_err(|_| ClientError::Timeout)??;
        let response: ControlResponse = joborc_wire::decode(&response_bytes)?;

        match response {
            ControlResponse::Submitted { root_id } => Ok(root_id),
            ControlResponse::Error { message } => Err(ClientError::Rejected(message)),
        }
    }
}

/// Client for the daemon's HTTP Read API (§6.3).
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    pub async fn status(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        self.get_json(&format!("/jobs/{job_id}/status"), &()).await
    }

    pub async fn logs(&self, job_id: &str, query: &LogsQuery) -> Result<LogsResponse, ClientError> {
        self.get_json(&format!("/jobs/{job_id}/logs"), query).await
    }

    pub async fn jobs(&self, query: &JobListQuery) -> Result<Vec<JobSummary>, ClientError> {
        self.get_json("/jobs", query).await
    }

    async fn get_json<Q: serde::Serialize, T: serde::de::DeserializeOwned>(&self, path: &str, query: &Q) -> Result<T, ClientError> {
        let response = self.http.get(format!("{}{path}", self.base_url)).query(query).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::HttpStatus { status, body });
        }
        Ok(response.json().await?)
    }
}
