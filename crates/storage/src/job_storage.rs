// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The job-record storage contract (§6.1 calls this `QueueStorage` even
//! though it stores [`Job`] records, not queue messages — the queue's own
//! contract is [`crate::MessageQueue`]). An in-memory reference
//! implementation is provided for tests and for single-process deployments;
//! a real backend (the relational store with secondary indexes mentioned in
//! spec §1) would implement the same trait against Postgres or similar.

use crate::error::StorageError;
use async_trait::async_trait;
use joborc_core::{Counters, CountersDelta, Job, JobId, JobStatus, JobType};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Filter for `ListJobs` (§4.5).
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    pub roots_only: bool,
}

/// Per-step aggregation returned by `GetStepStats` (§4.5), computed over
/// worker jobs sharing a `manager_id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub total: u64,
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub documents: u64,
}

#[async_trait]
pub trait QueueStorage: Send + Sync {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, StorageError>;
    async fn get_child_jobs(&self, parent_id: JobId) -> Result<Vec<Job>, StorageError>;
    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StorageError>;
    async fn save_job(&self, job: Job) -> Result<(), StorageError>;

    /// Idempotent; rejects transitions out of terminal states via
    /// [`joborc_core::JobStatusError`] surfaced as `StorageError::Transient`.
    async fn update_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        message: Option<String>,
        now_ms: u64,
    ) -> Result<bool, StorageError>;

    /// The sole counter mutation path (§4.5). Applies `delta` to `id`'s
    /// counters in one atomic step and returns the post-update counters.
    async fn update_progress_counters_atomic(
        &self,
        id: JobId,
        delta: CountersDelta,
        now_ms: u64,
    ) -> Result<Counters, StorageError>;

    /// Returns the post-increment value.
    async fn increment_document_count_atomic(&self, id: JobId) -> Result<i64, StorageError>;

    async fn update_job_heartbeat(&self, id: JobId, now_ms: u64) -> Result<(), StorageError>;

    /// Called exactly once at process startup (§4.5). Returns the count of
    /// jobs transitioned.
    async fn mark_running_jobs_as_pending(&self, reason: &str, now_ms: u64) -> Result<u64, StorageError>;

    /// Running jobs whose heartbeat is older than `threshold_minutes`.
    async fn get_stale_jobs(&self, threshold_minutes: u64, now_ms: u64) -> Result<Vec<Job>, StorageError>;

    async fn get_step_stats(&self, manager_id: JobId) -> Result<StepStats, StorageError>;
    async fn list_step_jobs(&self, manager_id: JobId) -> Result<Vec<Job>, StorageError>;
}

/// Reference in-memory implementation. A single `parking_lot::Mutex` guards
/// the whole table — coarse, but it is exactly what makes
/// `update_progress_counters_atomic` genuinely atomic with respect to every
/// other read or write in this process (§4.5's "linearizable" requirement).
#[derive(Clone, Default)]
pub struct InMemoryJobStorage {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl InMemoryJobStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueueStorage for InMemoryJobStorage {
    async fn get_job(&self, id: JobId) -> Result<Option<Job>, StorageError> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn get_child_jobs(&self, parent_id: JobId) -> Result<Vec<Job>, StorageError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, StorageError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| !filter.roots_only || j.is_root())
            .filter(|j| filter.status.map_or(true, |s| s == j.status))
            .filter(|j| filter.job_type.map_or(true, |t| t == j.job_type))
            .cloned()
            .collect())
    }

    async fn save_job(&self, job: Job) -> Result<(), StorageError> {
        self.jobs.lock().insert(job.id, job);
        Ok(())
    }

    async fn update_job_status(
        &self,
        id: JobId,
        status: JobStatus,
        message: Option<String>,
        now_ms: u64,
    ) -> Result<bool, StorageError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(&id).ok_or(StorageError::JobNotFound(id))?;
        job.transition(status, now_ms, message)
            .map_err(|e| StorageError::Transient(e.to_string()))
    }

    async fn update_progress_counters_atomic(
        &self,
        id: JobId,
        delta: CountersDelta,
        now_ms: u64,
    ) -> Result<Counters, StorageError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(&id).ok_or(StorageError::JobNotFound(id))?;
        if !delta.is_noop() {
            job.counters.apply(delta);
            job.updated_at_epoch_ms = now_ms;
            job.progress.current = job.counters.completed_children as u64;
            job.progress.total = job.counters.total_children as u64;
        }
        Ok(job.counters)
    }

    async fn increment_document_count_atomic(&self, id: JobId) -> Result<i64, StorageError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(&id).ok_or(StorageError::JobNotFound(id))?;
        job.counters.document_count += 1;
        Ok(job.counters.document_count)
    }

    async fn update_job_heartbeat(&self, id: JobId, now_ms: u64) -> Result<(), StorageError> {
        let mut jobs = self.jobs.lock();
        let job = jobs.get_mut(&id).ok_or(StorageError::JobNotFound(id))?;
        job.heartbeat_at_epoch_ms = Some(now_ms);
        Ok(())
    }

    async fn mark_running_jobs_as_pending(&self, reason: &str, now_ms: u64) -> Result<u64, StorageError> {
        let mut jobs = self.jobs.lock();
        let mut count = 0;
        for job in jobs.values_mut() {
            if job.status == JobStatus::Running {
                job.status = JobStatus::Pending;
                job.started_at_epoch_ms = None;
                job.heartbeat_at_epoch_ms = None;
                job.updated_at_epoch_ms = now_ms;
                job.error_message = Some(format!("recovered at startup: {reason}"));
                count += 1;
            }
        }
        Ok(count)
    }

    async fn get_stale_jobs(&self, threshold_minutes: u64, now_ms: u64) -> Result<Vec<Job>, StorageError> {
        let threshold_ms = threshold_minutes.saturating_mul(60_000);
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.status == JobStatus::Running)
            .filter(|j| match j.heartbeat_at_epoch_ms {
                Some(hb) => now_ms.saturating_sub(hb) >= threshold_ms,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_step_stats(&self, manager_id: JobId) -> Result<StepStats, StorageError> {
        let jobs = self.jobs.lock();
        let mut stats = StepStats::default();
        for job in jobs.values().filter(|j| j.manager_id == Some(manager_id)) {
            stats.total += 1;
            stats.documents += job.counters.document_count as u64;
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Running => stats.running += 1,
                JobStatus::Completed => stats.completed += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Cancelled => stats.cancelled += 1,
            }
        }
        Ok(stats)
    }

    async fn list_step_jobs(&self, manager_id: JobId) -> Result<Vec<Job>, StorageError> {
        Ok(self
            .jobs
            .lock()
            .values()
            .filter(|j| j.manager_id == Some(manager_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
#[path = "job_storage_tests.rs"]
mod tests;
