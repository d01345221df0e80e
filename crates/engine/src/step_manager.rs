// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Step Manager contract and registry (§4.6). The Registry maps `action`
//! strings to handlers bound once at startup; concrete managers live in
//! [`crate::step_managers`].

use crate::error::EngineError;
use crate::event_bus::EventBus;
use crate::job_manager::JobManager;
use crate::queue_manager::QueueManager;
use async_trait::async_trait;
use joborc_core::{Clock, CountersDelta, Event, Job, JobId, JobType, JsonMap, QueueMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of one `StepManager::execute` call (§4.6).
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    pub success: bool,
    pub children_spawned: u32,
    pub documents_produced: u32,
    pub error: Option<String>,
    pub result_payload: JsonMap,
}

impl StepResult {
    pub fn ok(result_payload: JsonMap) -> Self {
        Self { success: true, result_payload, ..Default::default() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Default::default() }
    }
}

/// Shared collaborators every Step Manager needs to spawn children and
/// enqueue their messages (§4.6 point 4).
#[derive(Clone)]
pub struct StepContext<C: Clock> {
    pub jobs: Arc<JobManager<C>>,
    pub queue: Arc<QueueManager>,
    pub bus: EventBus,
}

impl<C: Clock> StepContext<C> {
    /// `CreateJob`, counter bump on `parent_id`, enqueue, then `job_spawn`
    /// (§4.6 points 4 and 6), in the order the spec requires. `manager_id`
    /// is the owning Step job's id, carried down through however many
    /// levels of worker recursion a Step Manager spawns (§3.1).
    pub async fn spawn_child(
        &self,
        parent_id: JobId,
        manager_id: Option<JobId>,
        job_type: JobType,
        action: impl Into<String>,
        name: impl Into<String>,
        config: JsonMap,
        discovered_by: impl Into<String>,
        url: Option<String>,
        depth: Option<u32>,
    ) -> Result<JobId, EngineError> {
        let action = action.into();
        let child_id =
            self.jobs.create_job_with_manager(Some(parent_id), job_type, action.clone(), name, config, manager_id).await?;
        self.jobs.update_progress_counters_atomic(parent_id, CountersDelta::spawn_child()).await?;
        let now = self.jobs.now_ms();
        self.queue.enqueue(QueueMessage::new(child_id, action, now)).await?;
        let _ = self.bus.publish(
            &CancellationToken::new(),
            Event::JobSpawn { parent_job_id: parent_id, child_job_id: child_id, discovered_by: discovered_by.into(), url, depth },
        );
        Ok(child_id)
    }
}

/// A handler for one `action` (§4.6). `root_id` is the correlation id to
/// tag every log emitted during `execute` with — resolved once by the Job
/// Processor via a `parent_id` walk before dispatch.
#[async_trait]
pub trait StepManager<C: Clock>: Send + Sync {
    fn action(&self) -> &'static str;
    async fn execute(&self, ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult;
}

/// Maps `action` strings to their [`StepManager`] (§4.6).
pub struct StepManagerRegistry<C: Clock> {
    managers: HashMap<&'static str, Arc<dyn StepManager<C>>>,
}

impl<C: Clock> Default for StepManagerRegistry<C> {
    fn default() -> Self {
        Self { managers: HashMap::new() }
    }
}

impl<C: Clock> Clone for StepManagerRegistry<C> {
    fn clone(&self) -> Self {
        Self { managers: self.managers.clone() }
    }
}

impl<C: Clock> StepManagerRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, manager: Arc<dyn StepManager<C>>) {
        self.managers.insert(manager.action(), manager);
    }

    pub fn resolve(&self, action: &str) -> Option<Arc<dyn StepManager<C>>> {
        self.managers.get(action).cloned()
    }
}

#[cfg(test)]
#[path = "step_manager_tests.rs"]
mod tests;
