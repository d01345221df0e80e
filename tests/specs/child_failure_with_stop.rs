// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 4: 5 siblings under one parent with `on_error = stop,
//! max_failed = 0`; the second sibling fails, the parent fails, and the
//! remaining pending siblings are cancelled without ever executing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use joborc_core::{CountersDelta, JobStatus, JobType, QueueMessage};
use joborc_engine::{StepContext, StepManager, StepManagerRegistry, StepResult};
use serde_json::json;

use super::support::{wait_until, Harness};

struct CountingManager {
    action: &'static str,
    fail: bool,
    executions: Arc<AtomicU32>,
}

#[async_trait]
impl StepManager<joborc_core::SystemClock> for CountingManager {
    fn action(&self) -> &'static str {
        self.action
    }

    async fn execute(
        &self,
        _ctx: &StepContext<joborc_core::SystemClock>,
        _job: &joborc_core::Job,
        _root_id: joborc_core::JobId,
    ) -> StepResult {
        self.executions.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            StepResult::failed("boom")
        } else {
            StepResult::ok(Default::default())
        }
    }
}

#[tokio::test]
async fn siblings_after_a_stopping_failure_are_cancelled_without_executing() {
    let executions = Arc::new(AtomicU32::new(0));
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(CountingManager { action: "ok", fail: false, executions: executions.clone() }));
    registry.register(Arc::new(CountingManager { action: "boom", fail: true, executions: executions.clone() }));
    let harness = Harness::spawn(registry, 1);

    let parent_config = [("max_failed".to_string(), json!(0))].into();
    let parent_id = harness.jobs.create_job(None, JobType::Step, "root", "parent", parent_config).await.unwrap();

    let mut siblings = Vec::new();
    for i in 0..5 {
        let action = if i == 1 { "boom" } else { "ok" };
        let config = [("on_error".to_string(), json!("stop"))].into();
        let child_id = harness.jobs.create_job(Some(parent_id), JobType::Crawler, action, format!("sibling-{i}"), config).await.unwrap();
        harness.jobs.update_progress_counters_atomic(parent_id, CountersDelta::spawn_child()).await.unwrap();
        siblings.push(child_id);
    }

    // Enqueue sibling 2 (the failing one) first so it's guaranteed to be
    // dispatched before its pending neighbours, on a single worker.
    harness.queue.enqueue(QueueMessage::new(siblings[1], "boom", 0)).await.unwrap();
    for (i, id) in siblings.iter().enumerate() {
        if i != 1 {
            harness.queue.enqueue(QueueMessage::new(*id, "ok", 0)).await.unwrap();
        }
    }

    let settled = wait_until(Duration::from_secs(5), || {
        let jobs = harness.jobs.clone();
        async move { jobs.get_job(parent_id).await.ok().flatten().is_some_and(|j| j.status.is_terminal()) }
    })
    .await;
    assert!(settled, "parent should reach a terminal status");

    let parent = harness.jobs.get_job(parent_id).await.unwrap().unwrap();
    assert_eq!(parent.status, JobStatus::Failed);

    // Give already-dequeued siblings time to finish; the failure handler
    // cancels only those still Pending at the moment it runs.
    tokio::time::sleep(Duration::from_millis(50)).await;

    for (i, id) in siblings.iter().enumerate() {
        let sibling = harness.jobs.get_job(*id).await.unwrap().unwrap();
        if i == 1 {
            assert_eq!(sibling.status, JobStatus::Failed);
        } else {
            assert_eq!(sibling.status, JobStatus::Cancelled, "sibling {i} should be cancelled, not executed");
        }
    }
    // Only the failing sibling ever ran its StepManager — the rest were
    // cancelled while still queued, single-worker scheduling guarantees
    // they're dispatched after the cancellation already landed.
    assert_eq!(executions.load(Ordering::SeqCst), 1);

    harness.shutdown().await;
}
