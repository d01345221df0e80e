// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Job Processor (§4.7): a bounded pool of workers, each pulling one
//! message at a time from the Queue Manager, dispatching it to a
//! [`StepManager`], and propagating counters and termination to the
//! parent.

use crate::job_manager::JobManager;
use crate::queue_manager::QueueManager;
use crate::step_manager::{StepContext, StepManagerRegistry};
use joborc_core::{Clock, CountersDelta, Job, JobId, JobStatus, JobType, QueueMessage};
use joborc_runbook::OnError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const RECEIVE_WAIT: Duration = Duration::from_secs(10);

pub struct JobProcessor<C: Clock> {
    ctx: StepContext<C>,
    registry: Arc<StepManagerRegistry<C>>,
}

impl<C: Clock + 'static> JobProcessor<C> {
    pub fn new(
        jobs: Arc<JobManager<C>>,
        queue: Arc<QueueManager>,
        bus: crate::event_bus::EventBus,
        registry: Arc<StepManagerRegistry<C>>,
    ) -> Self {
        Self { ctx: StepContext { jobs, queue, bus }, registry }
    }

    /// Spawns `worker_count` workers, each running [`Self::worker_loop`]
    /// until `shutdown` fires.
    pub fn spawn_workers(self: Arc<Self>, worker_count: usize, shutdown: tokio::sync::watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        (0..worker_count)
            .map(|worker_id| {
                let processor = Arc::clone(&self);
                let mut shutdown = shutdown.clone();
                tokio::spawn(async move {
                    loop {
                        tokio::select! {
                            _ = shutdown.changed() => {
                                if *shutdown.borrow() {
                                    break;
                                }
                            }
                            () = processor.tick(worker_id) => {}
                        }
                    }
                })
            })
            .collect()
    }

    /// One full receive-dispatch-resolve cycle. Never errors outward —
    /// every failure path is logged and the loop continues.
    async fn tick(&self, worker_id: usize) {
        let received = match self.ctx.queue.receive(RECEIVE_WAIT).await {
            Ok(received) => received,
            Err(error) => {
                tracing::error!(worker_id, %error, "queue receive failed");
                return;
            }
        };
        let Some((message, handle)) = received else { return };

        let Some(manager) = self.registry.resolve(&message.action) else {
            tracing::error!(worker_id, job_id = %message.job_id, action = %message.action, "unknown action");
            if let Err(error) = self.ctx.jobs.update_job_status(message.job_id, JobStatus::Failed, Some("unknown action".to_string())).await {
                tracing::error!(worker_id, %error, "failed to mark job failed for unknown action");
            }
            if let Err(error) = self.ctx.queue.delete(handle).await {
                tracing::error!(worker_id, %error, "failed to delete message for unknown action");
            }
            return;
        };

        let job = match self.ctx.jobs.get_job(message.job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!(worker_id, job_id = %message.job_id, "job missing, dropping message");
                let _ = self.ctx.queue.delete(handle).await;
                return;
            }
            Err(error) => {
                tracing::error!(worker_id, %error, "failed to load job");
                return;
            }
        };
        if job.status.is_terminal() {
            let _ = self.ctx.queue.delete(handle).await;
            return;
        }

        if self.nearest_ancestor_is_cancelled(&job).await {
            tracing::info!(worker_id, job_id = %job.id, "skipping dispatch: ancestor cancelled");
            let _ = self.ctx.queue.delete(handle).await;
            return;
        }

        if let Err(error) = self.ctx.jobs.update_job_status(job.id, JobStatus::Running, None).await {
            tracing::error!(worker_id, %error, "failed to transition job to running");
        }

        let root_id = self.root_ancestor(&job).await;
        let result = self.run_with_heartbeat(&job, root_id, manager).await;

        self.apply_result(&job, &result).await;

        if let Err(error) = self.ctx.queue.delete(handle).await {
            tracing::error!(worker_id, job_id = %job.id, %error, "failed to delete queue message");
        }
    }

    async fn run_with_heartbeat(
        &self,
        job: &Job,
        root_id: JobId,
        manager: Arc<dyn crate::step_manager::StepManager<C>>,
    ) -> crate::step_manager::StepResult {
        let jobs = Arc::clone(&self.ctx.jobs);
        let job_id = job.id;
        let heartbeat = tokio::spawn(async move {
            loop {
                tokio::time::sleep(HEARTBEAT_INTERVAL).await;
                if jobs.update_job_heartbeat(job_id).await.is_err() {
                    break;
                }
            }
        });

        let result = manager.execute(&self.ctx, job, root_id).await;
        heartbeat.abort();
        result
    }

    /// Walks `parent_id` once to resolve the correlation id (§4.6 point 1,
    /// §9 "Correlation ID = root id").
    async fn root_ancestor(&self, job: &Job) -> JobId {
        let mut current = job.clone();
        while let Some(parent_id) = current.parent_id {
            match self.ctx.jobs.get_job(parent_id).await {
                Ok(Some(parent)) => current = parent,
                _ => break,
            }
        }
        current.id
    }

    async fn nearest_ancestor_is_cancelled(&self, job: &Job) -> bool {
        let mut current = job.clone();
        loop {
            let Some(parent_id) = current.parent_id else { return false };
            match self.ctx.jobs.get_job(parent_id).await {
                Ok(Some(parent)) => {
                    if parent.status == JobStatus::Cancelled {
                        return true;
                    }
                    current = parent;
                }
                _ => return false,
            }
        }
    }

    /// §4.7 step 5/6: apply the counter delta to the parent, transition
    /// self, then propagate parent termination.
    async fn apply_result(&self, job: &Job, result: &crate::step_manager::StepResult) {
        let status = if result.success { JobStatus::Completed } else { JobStatus::Failed };
        if let Err(error) = self.ctx.jobs.update_job_status(job.id, status, result.error.clone()).await {
            tracing::error!(job_id = %job.id, %error, "failed to transition job after execution");
        }

        if job.job_type == JobType::Step {
            self.dispatch_ready_steps(job).await;
        }

        let Some(parent_id) = job.parent_id else { return };
        let delta = if result.success { CountersDelta::child_completed() } else { CountersDelta::child_failed() };
        let counters = match self.ctx.jobs.update_progress_counters_atomic(parent_id, delta).await {
            Ok(counters) => counters,
            Err(error) => {
                tracing::error!(job_id = %job.id, %error, "failed to update parent counters");
                return;
            }
        };

        if !result.success {
            if let Err(error) = self.handle_child_failure(job, parent_id, &counters).await {
                tracing::error!(job_id = %job.id, %error, "failed to apply on_error policy");
            }
        }

        if counters.all_children_terminal() {
            let final_status = if counters.failed_children > 0 { JobStatus::Failed } else { JobStatus::Completed };
            if let Err(error) = self.ctx.jobs.update_job_status(parent_id, final_status, None).await {
                tracing::error!(job_id = %parent_id, %error, "failed to propagate parent termination");
            }
        }
    }

    /// §4.7 "Error tolerance": the failing job's own `on_error` governs
    /// whether its failure stops the parent; `max_failed` is a parent-level
    /// tolerance read off the parent job. `stop` fails the parent outright
    /// and cancels remaining pending children; `continue`/`mark_warning`
    /// are the worker's default fall-through (no special action here
    /// beyond the counter update already applied).
    async fn handle_child_failure(
        &self,
        failed_job: &Job,
        parent_id: JobId,
        counters: &joborc_core::Counters,
    ) -> Result<(), crate::error::EngineError> {
        let on_error: OnError =
            failed_job.config.get("on_error").and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default();
        let Some(parent) = self.ctx.jobs.get_job(parent_id).await? else { return Ok(()) };
        let max_failed = parent.config.get("max_failed").and_then(|v| v.as_i64()).unwrap_or(1);

        if on_error == OnError::Stop && counters.failed_children >= max_failed {
            self.ctx.jobs.update_job_status(parent_id, JobStatus::Failed, Some("child failure exceeded max_failed".to_string())).await?;
            self.cancel_pending_children(parent_id).await?;
        }
        Ok(())
    }

    /// §4.8: once `step` (a just-terminated step job) settles, check its
    /// sibling steps for any still-`Pending` one whose `depends_on` names
    /// are now all terminal, and dispatch it. `depends_on` holds step
    /// names, resolved against siblings sharing `step`'s `parent_id`
    /// (the definition's root job).
    async fn dispatch_ready_steps(&self, step: &Job) {
        let Some(root_id) = step.parent_id else { return };
        let siblings = match self.ctx.jobs.get_child_jobs(root_id).await {
            Ok(siblings) => siblings,
            Err(error) => {
                tracing::error!(job_id = %step.id, %error, "failed to load sibling steps for dependency gate");
                return;
            }
        };

        for sibling in &siblings {
            if sibling.status != JobStatus::Pending {
                continue;
            }
            let depends_on: Vec<String> =
                sibling.config.get("depends_on").and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default();
            if depends_on.is_empty() {
                // Enqueued by the Definition Orchestrator at launch already.
                continue;
            }
            let ready = depends_on
                .iter()
                .all(|name| siblings.iter().any(|s| &s.name == name && s.status.is_terminal()));
            if !ready {
                continue;
            }
            let now = self.ctx.jobs.now_ms();
            if let Err(error) = self.ctx.queue.enqueue(QueueMessage::new(sibling.id, sibling.action.clone(), now)).await {
                tracing::error!(job_id = %sibling.id, %error, "failed to enqueue dependent step");
            }
        }
    }

    async fn cancel_pending_children(&self, parent_id: JobId) -> Result<(), crate::error::EngineError> {
        for child in self.ctx.jobs.get_child_jobs(parent_id).await? {
            if child.status == JobStatus::Pending {
                self.ctx.jobs.update_job_status(child.id, JobStatus::Cancelled, None).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "job_processor_tests.rs"]
mod tests;
