// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;
use crate::event_bus::EventBus;
use crate::step_manager::{StepManager, StepResult};
use async_trait::async_trait;
use joborc_core::{Clock, JobType, QueueConfig, QueueMessage, SystemClock};
use joborc_storage::{InMemoryJobStorage, InMemoryMessageQueue};
use serde_json::json;

struct AlwaysSucceeds;

#[async_trait]
impl<C: Clock> StepManager<C> for AlwaysSucceeds {
    fn action(&self) -> &'static str {
        "noop"
    }
    async fn execute(&self, _ctx: &StepContext<C>, _job: &Job, _root_id: JobId) -> StepResult {
        StepResult::ok(Default::default())
    }
}

struct AlwaysFails;

#[async_trait]
impl<C: Clock> StepManager<C> for AlwaysFails {
    fn action(&self) -> &'static str {
        "boom"
    }
    async fn execute(&self, _ctx: &StepContext<C>, _job: &Job, _root_id: JobId) -> StepResult {
        StepResult::failed("boom")
    }
}

fn setup(registry: StepManagerRegistry<SystemClock>) -> (JobProcessor<SystemClock>, Arc<JobManager<SystemClock>>, Arc<QueueManager>) {
    let storage = Arc::new(InMemoryJobStorage::new());
    let bus = EventBus::new();
    let jobs = Arc::new(JobManager::new(storage, bus.clone(), SystemClock));
    let queue = Arc::new(QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default()));
    let processor = JobProcessor::new(jobs.clone(), queue.clone(), bus, Arc::new(registry));
    (processor, jobs, queue)
}

#[tokio::test]
async fn successful_step_completes_the_job_and_bumps_parent_counters() {
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(AlwaysSucceeds));
    let (processor, jobs, queue) = setup(registry);

    let parent_id = jobs.create_job(None, JobType::Step, "root", "parent", Default::default()).await.unwrap();
    jobs.update_progress_counters_atomic(parent_id, CountersDelta::spawn_child()).await.unwrap();
    let child_id = jobs.create_job(Some(parent_id), JobType::Crawler, "noop", "child", Default::default()).await.unwrap();
    queue.enqueue(QueueMessage::new(child_id, "noop", 0)).await.unwrap();

    processor.tick(0).await;

    let child = jobs.get_job(child_id).await.unwrap().unwrap();
    assert_eq!(child.status, JobStatus::Completed);
    let parent = jobs.get_job(parent_id).await.unwrap().unwrap();
    assert_eq!(parent.counters.completed_children, 1);
}

#[tokio::test]
async fn failed_step_with_stop_policy_fails_the_parent_and_cancels_siblings() {
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(AlwaysFails));
    registry.register(Arc::new(AlwaysSucceeds));
    let (processor, jobs, queue) = setup(registry);

    let parent_config = [("max_failed".to_string(), json!(1))].into();
    let parent_id = jobs.create_job(None, JobType::Step, "root", "parent", parent_config).await.unwrap();
    jobs.update_progress_counters_atomic(parent_id, CountersDelta::spawn_child()).await.unwrap();
    let failing_config = [("on_error".to_string(), json!("stop"))].into();
    let failing_child = jobs.create_job(Some(parent_id), JobType::Crawler, "boom", "failing", failing_config).await.unwrap();
    jobs.update_progress_counters_atomic(parent_id, CountersDelta::spawn_child()).await.unwrap();
    let sibling = jobs.create_job(Some(parent_id), JobType::Crawler, "noop", "sibling", Default::default()).await.unwrap();
    queue.enqueue(QueueMessage::new(failing_child, "boom", 0)).await.unwrap();

    processor.tick(0).await;

    let parent = jobs.get_job(parent_id).await.unwrap().unwrap();
    assert_eq!(parent.status, JobStatus::Failed);
    let sibling = jobs.get_job(sibling).await.unwrap().unwrap();
    assert_eq!(sibling.status, JobStatus::Cancelled);
}

#[tokio::test]
async fn unknown_action_fails_the_job_and_deletes_the_message() {
    let (processor, jobs, queue) = setup(StepManagerRegistry::new());
    let job_id = jobs.create_job(None, JobType::Step, "mystery", "mystery", Default::default()).await.unwrap();
    queue.enqueue(QueueMessage::new(job_id, "mystery", 0)).await.unwrap();

    processor.tick(0).await;

    let job = jobs.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(queue.receive(std::time::Duration::from_millis(10)).await.unwrap().is_none());
}

#[tokio::test]
async fn a_dependent_step_is_dispatched_only_after_its_dependency_settles() {
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(AlwaysSucceeds));
    let (processor, jobs, queue) = setup(registry);

    let root_id = jobs.create_job(None, JobType::Crawler, "root", "root", Default::default()).await.unwrap();
    jobs.update_progress_counters_atomic(root_id, CountersDelta::spawn_child()).await.unwrap();
    let fetch_id = jobs.create_job(Some(root_id), JobType::Step, "noop", "fetch", Default::default()).await.unwrap();
    jobs.update_progress_counters_atomic(root_id, CountersDelta::spawn_child()).await.unwrap();
    let convert_config = [("depends_on".to_string(), json!(["fetch"]))].into();
    let convert_id = jobs.create_job(Some(root_id), JobType::Step, "noop", "convert", convert_config).await.unwrap();
    queue.enqueue(QueueMessage::new(fetch_id, "noop", 0)).await.unwrap();

    // convert depends on fetch and was never enqueued by the test, mirroring
    // what the Definition Orchestrator would have done.
    let convert_before = jobs.get_job(convert_id).await.unwrap().unwrap();
    assert_eq!(convert_before.status, JobStatus::Pending);

    processor.tick(0).await;
    let fetch = jobs.get_job(fetch_id).await.unwrap().unwrap();
    assert_eq!(fetch.status, JobStatus::Completed);

    let dispatched = queue.receive(std::time::Duration::from_millis(50)).await.unwrap();
    let (message, _handle) = dispatched.expect("convert should now be enqueued");
    assert_eq!(message.job_id, convert_id);
}

#[tokio::test]
async fn a_message_whose_ancestor_is_cancelled_is_dropped_without_dispatch() {
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(AlwaysSucceeds));
    let (processor, jobs, queue) = setup(registry);

    let parent_id = jobs.create_job(None, JobType::Step, "root", "parent", Default::default()).await.unwrap();
    jobs.update_job_status(parent_id, JobStatus::Running, None).await.unwrap();
    jobs.update_job_status(parent_id, JobStatus::Cancelled, None).await.unwrap();
    let child_id = jobs.create_job(Some(parent_id), JobType::Crawler, "noop", "child", Default::default()).await.unwrap();
    queue.enqueue(QueueMessage::new(child_id, "noop", 0)).await.unwrap();

    processor.tick(0).await;

    let child = jobs.get_job(child_id).await.unwrap().unwrap();
    assert_eq!(child.status, JobStatus::Pending);
}
