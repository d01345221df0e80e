// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;
use crate::event_bus::EventBus;
use joborc_core::{JobStatus, QueueConfig, SystemClock};
use joborc_runbook::{DefinitionType, OnError, Step};
use joborc_storage::{InMemoryJobStorage, InMemoryMessageQueue};

fn definition() -> JobDefinition {
    JobDefinition {
        id: "def-1".into(),
        name: "crawl site".into(),
        definition_type: DefinitionType::Crawl,
        description: String::new(),
        schedule: None,
        enabled: true,
        auth_id: None,
        config: Default::default(),
        steps: vec![
            Step { name: "fetch".into(), action: "crawl".into(), config: Default::default(), on_error: OnError::Stop, depends_on: vec![] },
            Step {
                name: "convert".into(),
                action: "transform".into(),
                config: Default::default(),
                on_error: OnError::Stop,
                depends_on: vec!["fetch".into()],
            },
        ],
    }
}

fn orchestrator() -> DefinitionOrchestrator<SystemClock> {
    let storage = Arc::new(InMemoryJobStorage::new());
    let jobs = Arc::new(JobManager::new(storage, EventBus::new(), SystemClock));
    let queue = Arc::new(QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default()));
    DefinitionOrchestrator::new(jobs, queue)
}

#[tokio::test]
async fn launch_creates_a_root_and_one_step_job_per_step() {
    let orchestrator = orchestrator();
    let root_id = orchestrator.launch(&definition()).await.unwrap();

    let root = orchestrator.jobs.get_job(root_id).await.unwrap().unwrap();
    assert_eq!(root.job_type, JobType::Crawler);
    assert_eq!(root.status, JobStatus::Pending);
    assert_eq!(root.counters.total_children, 2);

    let children = orchestrator.jobs.get_child_jobs(root_id).await.unwrap();
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|c| c.job_type == JobType::Step));
}

#[tokio::test]
async fn only_steps_with_no_dependencies_are_enqueued_at_launch() {
    let orchestrator = orchestrator();
    let root_id = orchestrator.launch(&definition()).await.unwrap();

    let (first, _) = orchestrator.queue.receive(std::time::Duration::from_millis(50)).await.unwrap().unwrap();
    assert_eq!(first.action, "crawl");

    let gated = orchestrator.queue.receive(std::time::Duration::from_millis(50)).await.unwrap();
    assert!(gated.is_none(), "convert depends on fetch and must not be enqueued until fetch settles");
    let _ = root_id;
}

#[tokio::test]
async fn a_dependent_step_job_is_created_pending_with_its_depends_on_recorded() {
    let orchestrator = orchestrator();
    let root_id = orchestrator.launch(&definition()).await.unwrap();

    let children = orchestrator.jobs.get_child_jobs(root_id).await.unwrap();
    let convert = children.iter().find(|c| c.action == "transform").unwrap();
    assert_eq!(convert.status, JobStatus::Pending);
    let depends_on: Vec<String> = convert.config.get("depends_on").and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default();
    assert_eq!(depends_on, vec!["fetch".to_string()]);
}
