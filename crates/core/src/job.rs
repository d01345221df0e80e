// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Job identifier, status machine, and the persistent [`Job`] record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a job instance.
    ///
    /// Every job — root, step, or worker — gets one of these. Logs and
    /// events correlate on the root ancestor's `JobId` (see the Job
    /// Manager's `parent_id` walk in `joborc-engine`).
    pub struct JobId("job-");
}

/// Status of a job. Transitions follow `Pending -> Running -> {terminal}`;
/// terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Terminal statuses are absorbing: no further transition is permitted.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether `self -> next` is a legal transition per the job status
    /// machine (`pending -> running -> {completed, failed, cancelled}`).
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        if self.is_terminal() {
            // Idempotent no-op: re-requesting the same terminal status is allowed.
            return self == next;
        }
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending, Cancelled)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Cancelled)
        )
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

/// The technical category of job, distinct from a definition's UI-facing
/// `type`, which gets translated into one of these (§3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Crawler,
    Transform,
    Agent,
    Reindex,
    PlacesSearch,
    Maintenance,
    /// A direct child of the root representing one step of the definition.
    Step,
    /// The top of one execution tree; has no parent.
    Root,
}

crate::simple_display! {
    JobType {
        Crawler => "crawler",
        Transform => "transform",
        Agent => "agent",
        Reindex => "reindex",
        PlacesSearch => "places_search",
        Maintenance => "maintenance",
        Step => "step",
        Root => "root",
    }
}

/// `{current, total}` progress counters shown to the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

/// Child-job aggregation counters.
///
/// Invariant (§3.1): `total_children == pending + running + completed +
/// failed + cancelled` at every moment an update completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub total_children: i64,
    pub pending_children: i64,
    pub running_children: i64,
    pub completed_children: i64,
    pub failed_children: i64,
    pub cancelled_children: i64,
    pub document_count: i64,
}

impl Counters {
    /// Checks the §3.1 / §8-property-1 counter invariant.
    pub fn is_consistent(&self) -> bool {
        self.total_children
            == self.pending_children
                + self.running_children
                + self.completed_children
                + self.failed_children
                + self.cancelled_children
    }

    pub fn apply(&mut self, delta: CountersDelta) {
        self.pending_children += delta.pending;
        self.running_children += delta.running;
        self.completed_children += delta.completed;
        self.failed_children += delta.failed;
        self.cancelled_children += delta.cancelled;
        self.total_children += delta.total;
    }

    /// True once every spawned child has reached a terminal state.
    pub fn all_children_terminal(&self) -> bool {
        self.total_children > 0 && self.pending_children == 0 && self.running_children == 0
    }
}

/// A delta to apply atomically via `UpdateProgressCountersAtomic` (§4.5).
/// All-zero is defined as a no-op (§8 idempotence law).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersDelta {
    pub pending: i64,
    pub running: i64,
    pub completed: i64,
    pub failed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl CountersDelta {
    pub fn is_noop(&self) -> bool {
        *self == CountersDelta::default()
    }

    pub fn spawn_child() -> Self {
        Self { pending: 1, total: 1, ..Default::default() }
    }

    pub fn child_completed() -> Self {
        Self { running: -1, completed: 1, ..Default::default() }
    }

    pub fn child_failed() -> Self {
        Self { running: -1, failed: 1, ..Default::default() }
    }

    pub fn child_cancelled() -> Self {
        Self { pending: -1, cancelled: 1, ..Default::default() }
    }

    pub fn pending_to_running() -> Self {
        Self { pending: -1, running: 1, ..Default::default() }
    }
}

/// A mapping from string keys to JSON-typed values, used for `config` and
/// `result` payloads (§3.1).
pub type JsonMap = HashMap<String, serde_json::Value>;

/// A persistent job record (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub parent_id: Option<JobId>,
    /// Populated for worker jobs: the id of the StepManager's owning step job.
    pub manager_id: Option<JobId>,
    pub job_type: JobType,
    pub name: String,
    pub description: String,
    pub action: String,
    pub status: JobStatus,
    pub config: JsonMap,
    pub progress: Progress,
    pub counters: Counters,
    pub auth_id: Option<String>,
    pub created_at_epoch_ms: u64,
    pub updated_at_epoch_ms: u64,
    pub started_at_epoch_ms: Option<u64>,
    pub completed_at_epoch_ms: Option<u64>,
    pub heartbeat_at_epoch_ms: Option<u64>,
    pub error_message: Option<String>,
    pub result: JsonMap,
}

impl Job {
    /// Construct a freshly `Pending` job. Used by the Definition Orchestrator
    /// and by Step Managers when spawning children.
    pub fn new(
        id: JobId,
        parent_id: Option<JobId>,
        job_type: JobType,
        action: impl Into<String>,
        name: impl Into<String>,
        config: JsonMap,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            parent_id,
            manager_id: None,
            job_type,
            name: name.into(),
            description: String::new(),
            action: action.into(),
            status: JobStatus::Pending,
            config,
            progress: Progress::default(),
            counters: Counters::default(),
            auth_id: None,
            created_at_epoch_ms: now_ms,
            updated_at_epoch_ms: now_ms,
            started_at_epoch_ms: None,
            completed_at_epoch_ms: None,
            heartbeat_at_epoch_ms: None,
            error_message: None,
            result: JsonMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Tags this job as a worker owned by `manager_id` (the Step job that
    /// spawned it, or — for a worker spawning further workers — the same
    /// owning step it was itself tagged with), for `GetStepStats`/
    /// `ListStepJobs` (§4.5) to aggregate by.
    pub fn with_manager_id(mut self, manager_id: Option<JobId>) -> Self {
        self.manager_id = manager_id;
        self
    }

    /// Attempt `self.status -> next`, applying §3.1 timestamp side effects.
    /// Idempotent: re-requesting the job's current terminal status is a no-op
    /// that still returns `Ok(false)`, satisfying the §8 idempotence law.
    pub fn transition(
        &mut self,
        next: JobStatus,
        now_ms: u64,
        error_message: Option<String>,
    ) -> Result<bool, JobStatusError> {
        if self.status == next && self.status.is_terminal() {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(JobStatusError::IllegalTransition { from: self.status, to: next });
        }
        self.status = next;
        self.updated_at_epoch_ms = now_ms;
        match next {
            JobStatus::Running => {
                self.started_at_epoch_ms.get_or_insert(now_ms);
                self.heartbeat_at_epoch_ms = Some(now_ms);
            }
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled => {
                self.completed_at_epoch_ms = Some(now_ms);
                if let Some(msg) = error_message {
                    self.error_message = Some(msg);
                }
            }
            JobStatus::Pending => {}
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum JobStatusError {
    #[error("illegal status transition from {from} to {to}")]
    IllegalTransition { from: JobStatus, to: JobStatus },
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct JobBuilder => Job {
        set { id: JobId = JobId::new() }
        option { parent_id: JobId = None }
        option { manager_id: JobId = None }
        set { job_type: JobType = JobType::Root }
        into { name: String = "test-job" }
        into { description: String = "" }
        into { action: String = "noop" }
        set { status: JobStatus = JobStatus::Pending }
        set { config: JsonMap = JsonMap::new() }
        set { progress: Progress = Progress::default() }
        set { counters: Counters = Counters::default() }
        option { auth_id: String = None }
        set { created_at_epoch_ms: u64 = 0 }
        set { updated_at_epoch_ms: u64 = 0 }
        option { started_at_epoch_ms: u64 = None }
        option { completed_at_epoch_ms: u64 = None }
        option { heartbeat_at_epoch_ms: u64 = None }
        option { error_message: String = None }
        set { result: JsonMap = JsonMap::new() }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
