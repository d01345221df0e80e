// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 1: a two-step crawl definition runs to completion and its
//! crawl step's counters reflect every spawned URL child.

use std::sync::Arc;
use std::time::Duration;

use joborc_adapters::fakes::FakeFetcher;
use joborc_adapters::FetchedPage;
use joborc_core::{JobStatus, JobType};
use joborc_engine::{CrawlStepManager, DefinitionOrchestrator, StepManagerRegistry, TransformStepManager};
use joborc_runbook::{DefinitionType, JobDefinition, OnError, Step};
use serde_json::json;

use super::support::{wait_until, Harness};

fn definition() -> JobDefinition {
    JobDefinition {
        id: "crawl-two-step".into(),
        name: "crawl example.com".into(),
        definition_type: DefinitionType::Crawl,
        description: String::new(),
        schedule: None,
        enabled: true,
        auth_id: None,
        config: Default::default(),
        steps: vec![
            Step {
                name: "fetch".into(),
                action: "crawl".into(),
                config: [("seed_urls".to_string(), json!(["https://a.test"])), ("max_depth".to_string(), json!(1))].into(),
                on_error: OnError::Stop,
                depends_on: vec![],
            },
            Step {
                name: "convert".into(),
                action: "transform".into(),
                config: [("html".to_string(), json!("<p>hello</p>"))].into(),
                on_error: OnError::Stop,
                depends_on: vec!["fetch".into()],
            },
        ],
    }
}

fn fetcher() -> FakeFetcher {
    FakeFetcher::new().with_page(
        "https://a.test",
        FetchedPage {
            status: 200,
            content_type: "text/html".into(),
            body: "<html></html>".into(),
            links: vec!["https://a.test/one".into(), "https://a.test/two".into(), "https://a.test/three".into()],
        },
    )
}

#[tokio::test]
async fn crawl_step_completes_with_counters_matching_spawned_children() {
    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(CrawlStepManager::new(Arc::new(fetcher()))));
    registry.register(Arc::new(TransformStepManager));
    let harness = Harness::spawn(registry, 2);

    let orchestrator = DefinitionOrchestrator::new(harness.jobs.clone(), harness.queue.clone());
    let root_id = orchestrator.launch(&definition()).await.unwrap();

    let settled = wait_until(Duration::from_secs(5), || {
        let jobs = harness.jobs.clone();
        async move { jobs.get_job(root_id).await.ok().flatten().is_some_and(|j| j.status.is_terminal()) }
    })
    .await;
    assert!(settled, "root should reach a terminal status");

    let root = harness.jobs.get_job(root_id).await.unwrap().unwrap();
    assert_eq!(root.status, JobStatus::Completed);
    assert_eq!(root.job_type, JobType::Crawler);

    let steps = harness.jobs.get_child_jobs(root_id).await.unwrap();
    let fetch_step = steps.iter().find(|j| j.action == "crawl").unwrap();

    let fetch_settled = wait_until(Duration::from_secs(5), || {
        let jobs = harness.jobs.clone();
        let id = fetch_step.id;
        async move { jobs.get_job(id).await.ok().flatten().is_some_and(|j| j.counters.all_children_terminal()) }
    })
    .await;
    assert!(fetch_settled, "crawl step's children should all finish");

    let fetch_step = harness.jobs.get_job(fetch_step.id).await.unwrap().unwrap();
    assert_eq!(fetch_step.status, JobStatus::Completed);
    assert_eq!(fetch_step.counters.total_children, 3);
    assert_eq!(fetch_step.counters.completed_children, 3);

    let crawl_children = harness.jobs.get_child_jobs(fetch_step.id).await.unwrap();
    assert_eq!(crawl_children.len(), 3);
    assert!(crawl_children.iter().all(|c| c.status == JobStatus::Completed));

    harness.shutdown().await;
}
