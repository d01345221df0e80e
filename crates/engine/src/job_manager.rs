// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Job Manager (§4.5): the only path that mutates [`Job`] records. Every
//! mutation that corresponds to a lifecycle or progress event in §6.2
//! publishes it on the [`EventBus`] in the same call — Step Managers and
//! the Job Processor never publish these directly.

use crate::error::EngineError;
use crate::event_bus::EventBus;
use joborc_core::{Clock, Counters, CountersDelta, Event, Job, JobId, JobStatus, JobType, JsonMap};
use joborc_storage::{JobFilter, QueueStorage, StepStats};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct JobManager<C: Clock> {
    storage: Arc<dyn QueueStorage>,
    bus: EventBus,
    clock: C,
}

impl<C: Clock> JobManager<C> {
    pub fn new(storage: Arc<dyn QueueStorage>, bus: EventBus, clock: C) -> Self {
        Self { storage, bus, clock }
    }

    pub async fn create_job(
        &self,
        parent_id: Option<JobId>,
        job_type: JobType,
        action: impl Into<String>,
        name: impl Into<String>,
        config: JsonMap,
    ) -> Result<JobId, EngineError> {
        self.create_job_with_manager(parent_id, job_type, action, name, config, None).await
    }

    /// Same as [`Self::create_job`], but tags the new job with the owning
    /// Step job's id (§3.1's `manager_id`) — used when a Step Manager
    /// spawns a worker child rather than the Definition Orchestrator
    /// creating a root or step job.
    pub async fn create_job_with_manager(
        &self,
        parent_id: Option<JobId>,
        job_type: JobType,
        action: impl Into<String>,
        name: impl Into<String>,
        config: JsonMap,
        manager_id: Option<JobId>,
    ) -> Result<JobId, EngineError> {
        let now = self.clock.epoch_ms();
        let job = Job::new(JobId::new(), parent_id, job_type, action, name, config, now).with_manager_id(manager_id);
        let id = job.id;
        self.storage.save_job(job).await?;
        let _ = self.bus.publish(&CancellationToken::new(), Event::JobCreated { job_id: id, job_type: job_type.to_string(), parent_id });
        Ok(id)
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }

    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>, EngineError> {
        Ok(self.storage.get_job(id).await?)
    }

    pub async fn get_child_jobs(&self, parent_id: JobId) -> Result<Vec<Job>, EngineError> {
        Ok(self.storage.get_child_jobs(parent_id).await?)
    }

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, EngineError> {
        Ok(self.storage.list_jobs(filter).await?)
    }

    /// Idempotent (§4.5, §8 round-trip law): re-requesting a job's current
    /// terminal status returns `Ok(false)` and publishes nothing.
    pub async fn update_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        message: Option<String>,
    ) -> Result<bool, EngineError> {
        let now = self.clock.epoch_ms();
        let changed = self.storage.update_job_status(id, status, message.clone(), now).await?;
        if changed {
            if let Some(event) = Event::for_status_transition(id, status, now, message.as_deref(), HashMap::new()) {
                let _ = self.bus.publish(&CancellationToken::new(), event);
            }
        }
        Ok(changed)
    }

    /// The sole counter mutation path (§4.5). All-zero deltas are a no-op
    /// (§8 idempotence law) and still publish `job_progress` so subscribers
    /// observe the current counters on request, even when nothing changed.
    pub async fn update_progress_counters_atomic(
        &self,
        id: JobId,
        delta: CountersDelta,
    ) -> Result<Counters, EngineError> {
        let now = self.clock.epoch_ms();
        let counters = self.storage.update_progress_counters_atomic(id, delta, now).await?;
        let _ = self.bus.publish(
            &CancellationToken::new(),
            Event::JobProgress { job_id: id, current: counters.completed_children as u64, total: counters.total_children as u64, counters },
        );
        Ok(counters)
    }

    pub async fn increment_document_count_atomic(&self, id: JobId) -> Result<i64, EngineError> {
        Ok(self.storage.increment_document_count_atomic(id).await?)
    }

    pub async fn update_job_heartbeat(&self, id: JobId) -> Result<(), EngineError> {
        let now = self.clock.epoch_ms();
        Ok(self.storage.update_job_heartbeat(id, now).await?)
    }

    /// Called exactly once at process startup (§4.5).
    pub async fn mark_running_jobs_as_pending(&self, reason: &str) -> Result<u64, EngineError> {
        let now = self.clock.epoch_ms();
        Ok(self.storage.mark_running_jobs_as_pending(reason, now).await?)
    }

    pub async fn get_stale_jobs(&self, threshold_minutes: u64) -> Result<Vec<Job>, EngineError> {
        let now = self.clock.epoch_ms();
        Ok(self.storage.get_stale_jobs(threshold_minutes, now).await?)
    }

    pub async fn get_step_stats(&self, manager_id: JobId) -> Result<StepStats, EngineError> {
        Ok(self.storage.get_step_stats(manager_id).await?)
    }

    pub async fn list_step_jobs(&self, manager_id: JobId) -> Result<Vec<Job>, EngineError> {
        Ok(self.storage.list_step_jobs(manager_id).await?)
    }
}

#[cfg(test)]
#[path = "job_manager_tests.rs"]
mod tests;
