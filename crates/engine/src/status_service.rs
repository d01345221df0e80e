// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Status Service (SPEC_FULL.md supplemented component): subscribes to
//! lifecycle and progress events, maintains a per-root aggregate plus a
//! global `{idle, running, degraded}` reading, and republishes
//! `status_changed` whenever the global reading transitions.

use crate::event_bus::EventBus;
use crate::job_manager::JobManager;
use joborc_core::{Clock, Event, JobId};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalState {
    Idle,
    Running,
    Degraded,
}

impl GlobalState {
    fn as_str(self) -> &'static str {
        match self {
            GlobalState::Idle => "idle",
            GlobalState::Running => "running",
            GlobalState::Degraded => "degraded",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RootAggregate {
    running_count: u64,
    completed_count: u64,
    failed_count: u64,
    cancelled_count: u64,
    degraded: bool,
}

pub struct StatusService<C: Clock> {
    jobs: Arc<JobManager<C>>,
    bus: EventBus,
    roots: Mutex<HashMap<JobId, RootAggregate>>,
    last_global: Mutex<Option<GlobalState>>,
}

impl<C: Clock> StatusService<C> {
    pub fn new(jobs: Arc<JobManager<C>>, bus: EventBus) -> Self {
        Self { jobs, bus, roots: Mutex::new(HashMap::new()), last_global: Mutex::new(None) }
    }

    /// Consumes events from its own subscription until the bus is dropped.
    pub async fn run(&self) {
        let mut subscription = self.bus.subscribe();
        while let Some(event) = subscription.recv().await {
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&self, event: Event) {
        match event {
            Event::JobCreated { job_id, parent_id, .. } if parent_id.is_none() => {
                self.roots.lock().entry(job_id).or_default();
            }
            Event::JobStarted { job_id, .. } => {
                if let Some(root_id) = self.resolve_root(job_id).await {
                    self.roots.lock().entry(root_id).or_default().running_count += 1;
                }
            }
            Event::JobCompleted { job_id, .. } => {
                if let Some(root_id) = self.resolve_root(job_id).await {
                    let mut roots = self.roots.lock();
                    let aggregate = roots.entry(root_id).or_default();
                    aggregate.running_count = aggregate.running_count.saturating_sub(1);
                    aggregate.completed_count += 1;
                }
            }
            Event::JobFailed { job_id, .. } => {
                if let Some(root_id) = self.resolve_root(job_id).await {
                    let mut roots = self.roots.lock();
                    let aggregate = roots.entry(root_id).or_default();
                    aggregate.running_count = aggregate.running_count.saturating_sub(1);
                    aggregate.failed_count += 1;
                    aggregate.degraded = aggregate.running_count > 0;
                }
            }
            Event::JobCancelled { job_id, .. } => {
                if let Some(root_id) = self.resolve_root(job_id).await {
                    self.roots.lock().entry(root_id).or_default().cancelled_count += 1;
                }
            }
            Event::JobProgress { job_id, counters, .. } => {
                if let Ok(Some(job)) = self.jobs.get_job(job_id).await {
                    if job.parent_id.is_none() {
                        let mut roots = self.roots.lock();
                        let aggregate = roots.entry(job_id).or_default();
                        aggregate.degraded = counters.failed_children > 0 && aggregate.running_count > 0;
                    }
                }
            }
            _ => return,
        }
        self.publish_if_changed();
    }

    async fn resolve_root(&self, job_id: JobId) -> Option<JobId> {
        let mut current = self.jobs.get_job(job_id).await.ok().flatten()?;
        while let Some(parent_id) = current.parent_id {
            match self.jobs.get_job(parent_id).await {
                Ok(Some(parent)) => current = parent,
                _ => break,
            }
        }
        Some(current.id)
    }

    fn global_state(&self) -> GlobalState {
        let roots = self.roots.lock();
        if roots.values().any(|r| r.degraded) {
            return GlobalState::Degraded;
        }
        if roots.values().any(|r| r.running_count > 0) {
            return GlobalState::Running;
        }
        GlobalState::Idle
    }

    fn publish_if_changed(&self) {
        let current = self.global_state();
        let mut last = self.last_global.lock();
        if *last == Some(current) {
            return;
        }
        *last = Some(current);
        let _ = self.bus.publish(
            &CancellationToken::new(),
            Event::StatusChanged { state: current.as_str().to_string(), metadata: [("root_count".to_string(), json!(self.roots.lock().len()))].into() },
        );
    }
}

#[cfg(test)]
#[path = "status_service_tests.rs"]
mod tests;
