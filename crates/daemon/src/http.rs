// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Minimal read API (§6.3, SUPPLEMENTED FEATURES): the three endpoints a
//! browser UI would drive against the engine, served over `axum`. The
//! WebSocket transport and the UI itself are out of scope — this exists so
//! the Read API surface is exercisable end to end.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use joborc_core::{Clock, JobId, LogLevel};
use joborc_engine::{JobManager, LogService};
use joborc_storage::JobFilter;
use joborc_wire::{JobListQuery, JobStatusResponse, JobSummary, LogsQuery, ReadApiError};

#[derive(Clone)]
pub struct ApiState<C: Clock> {
    pub jobs: Arc<JobManager<C>>,
    pub log_service: Arc<LogService>,
}

pub fn router<C: Clock + 'static>(state: ApiState<C>) -> Router {
    Router::new()
        .route("/jobs/:id/logs", get(get_logs::<C>))
        .route("/jobs/:id/status", get(get_status::<C>))
        .route("/jobs", get(list_jobs::<C>))
        .with_state(state)
}

fn parse_level(raw: &str) -> Result<Option<LogLevel>, ReadApiError> {
    match raw.to_ascii_uppercase().as_str() {
        "ALL" => Ok(None),
        "TRC" => Ok(Some(LogLevel::Trc)),
        "DBG" => Ok(Some(LogLevel::Dbg)),
        "INF" => Ok(Some(LogLevel::Inf)),
        "WAR" => Ok(Some(LogLevel::War)),
        "ERR" => Ok(Some(LogLevel::Err)),
        _ => Err(ReadApiError::UnknownLevel),
    }
}

async fn get_logs<C: Clock + 'static>(
    State(state): State<ApiState<C>>,
    Path(id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<joborc_wire::LogsResponse>, ApiError> {
    let level = match &query.level {
        Some(raw) => parse_level(raw)?,
        None => None,
    };
    let limit = query.limit.unwrap_or(100);
    let response = state
        .log_service
        .get_aggregated_logs(JobId::from_string(id), query.include_descendants, level, limit, query.cursor, query.order)
        .await?;
    Ok(Json(response))
}

async fn get_status<C: Clock + 'static>(
    State(state): State<ApiState<C>>,
    Path(id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let job = state.jobs.get_job(JobId::from_string(id)).await.map_err(|_| ApiError(ReadApiError::JobNotFound))?;
    let job = job.ok_or(ApiError(ReadApiError::JobNotFound))?;
    Ok(Json(JobStatusResponse::from(&job)))
}

async fn list_jobs<C: Clock + 'static>(
    State(state): State<ApiState<C>>,
    Query(query): Query<JobListQuery>,
) -> Result<Json<Vec<JobSummary>>, ApiError> {
    let filter = JobFilter { status: query.status, job_type: query.job_type, roots_only: true };
    let jobs = state.jobs.list_jobs(&filter).await.map_err(|_| ApiError(ReadApiError::JobNotFound))?;
    Ok(Json(jobs.iter().map(JobSummary::from).collect()))
}

/// Wraps [`ReadApiError`] to map it onto HTTP status codes (§7: malformed
/// cursor is 400, unknown job is 404).
struct ApiError(ReadApiError);

impl From<ReadApiError> for ApiError {
    fn from(err: ReadApiError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReadApiError::JobNotFound => StatusCode::NOT_FOUND,
            ReadApiError::MalformedCursor | ReadApiError::UnknownLevel => StatusCode::BAD_REQUEST,
            ReadApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
