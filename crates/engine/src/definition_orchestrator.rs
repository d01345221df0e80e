// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Definition Orchestrator (§4.8): expands a [`JobDefinition`] into a root
//! job plus one step job per step, in topological order of `depends_on`.

use crate::error::EngineError;
use crate::job_manager::JobManager;
use crate::queue_manager::QueueManager;
use joborc_core::{Clock, JobId, JobType, QueueMessage};
use joborc_runbook::{topological_order, JobDefinition};
use std::sync::Arc;

pub struct DefinitionOrchestrator<C: Clock> {
    jobs: Arc<JobManager<C>>,
    queue: Arc<QueueManager>,
}

impl<C: Clock> DefinitionOrchestrator<C> {
    pub fn new(jobs: Arc<JobManager<C>>, queue: Arc<QueueManager>) -> Self {
        Self { jobs, queue }
    }

    /// Creates the root job and, in topological order, a step job per
    /// `Step`. Only steps with no `depends_on` are enqueued here (spec.md's
    /// "enqueues its first step"); steps that depend on others are created
    /// `Pending` and dispatched later, by the Job Processor, once every
    /// step named in their `depends_on` has reached a terminal status.
    ///
    /// Each step job's config carries its own `on_error` and `depends_on`,
    /// so the Job Processor can read the failing step's own
    /// error-tolerance policy, and the dependency gate, straight off the
    /// job itself.
    pub async fn launch(&self, definition: &JobDefinition) -> Result<JobId, EngineError> {
        let root_id = self
            .jobs
            .create_job(None, definition.definition_type.to_job_type(), "root", definition.name.clone(), definition.config.clone())
            .await?;

        let steps = topological_order(definition)?;
        for step in steps {
            let mut config = step.config.clone();
            config.insert("on_error".to_string(), serde_json::to_value(step.on_error).expect("OnError serializes"));
            config.insert("depends_on".to_string(), serde_json::to_value(&step.depends_on).expect("Vec<String> serializes"));
            let step_id =
                self.jobs.create_job(Some(root_id), JobType::Step, step.action.clone(), step.name.clone(), config).await?;
            self.jobs.update_progress_counters_atomic(root_id, joborc_core::CountersDelta::spawn_child()).await?;
            if step.depends_on.is_empty() {
                let now = self.jobs.now_ms();
                self.queue.enqueue(QueueMessage::new(step_id, step.action.clone(), now)).await?;
            }
        }

        Ok(root_id)
    }
}

#[cfg(test)]
#[path = "definition_orchestrator_tests.rs"]
mod tests;
