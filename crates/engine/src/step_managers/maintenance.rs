// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Maintenance Step Manager (§4.6): schedule-triggered housekeeping —
//! fails jobs whose heartbeat has gone stale so their parents can
//! propagate termination instead of waiting forever, and fails jobs
//! whose queue message has been dead-lettered (§7 "Queue deletion
//! failure").

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_core::{Clock, Job, JobId, JobStatus};
use serde_json::json;

const DEFAULT_STALE_THRESHOLD_MINUTES: u64 = 10;

pub struct MaintenanceStepManager;

#[async_trait]
impl<C: Clock> StepManager<C> for MaintenanceStepManager {
    fn action(&self) -> &'static str {
        "maintenance"
    }

    async fn execute(&self, ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let threshold_minutes =
            job.config.get("stale_threshold_minutes").and_then(|v| v.as_u64()).unwrap_or(DEFAULT_STALE_THRESHOLD_MINUTES);

        let stale = match ctx.jobs.get_stale_jobs(threshold_minutes).await {
            Ok(stale) => stale,
            Err(error) => return StepResult::failed(error.to_string()),
        };

        let mut failed = 0;
        for stale_job in &stale {
            tracing::warn!(job_id = %root_id, stale_job_id = %stale_job.id, "marking stale job failed");
            match ctx
                .jobs
                .update_job_status(stale_job.id, JobStatus::Failed, Some("stale: heartbeat timeout".to_string()))
                .await
            {
                Ok(true) => failed += 1,
                Ok(false) => {}
                Err(error) => tracing::warn!(job_id = %root_id, stale_job_id = %stale_job.id, %error, "failed to fail stale job"),
            }
        }

        let dead_lettered = match ctx.queue.dead_letters().await {
            Ok(messages) => messages,
            Err(error) => return StepResult::failed(error.to_string()),
        };

        let mut dead_lettered_failed = 0;
        for message in &dead_lettered {
            let error_message = format!("dead-lettered after {} receives", message.receive_count);
            tracing::warn!(job_id = %root_id, dead_job_id = %message.job_id, "failing dead-lettered job");
            match ctx.jobs.update_job_status(message.job_id, JobStatus::Failed, Some(error_message)).await {
                Ok(true) => dead_lettered_failed += 1,
                Ok(false) => {}
                Err(error) => tracing::warn!(job_id = %root_id, dead_job_id = %message.job_id, %error, "failed to fail dead-lettered job"),
            }
        }

        StepResult::ok(
            [("stale_jobs_failed".to_string(), json!(failed)), ("dead_lettered_jobs_failed".to_string(), json!(dead_lettered_failed))]
                .into(),
        )
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
