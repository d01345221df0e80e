// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;
use crate::event_bus::EventBus;
use crate::job_manager::JobManager;
use crate::queue_manager::QueueManager;
use joborc_adapters::fakes::FakeSearchIndexClient;
use joborc_core::{JobType, QueueConfig, SystemClock};
use joborc_storage::{InMemoryJobStorage, InMemoryMessageQueue};
use serde_json::json;

fn context() -> StepContext<SystemClock> {
    let jobs = Arc::new(InMemoryJobStorage::new());
    let bus = EventBus::new();
    let job_manager = Arc::new(JobManager::new(jobs, bus.clone(), SystemClock));
    let queue_manager = Arc::new(QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default()));
    StepContext { jobs: job_manager, queue: queue_manager, bus }
}

#[tokio::test]
async fn reindexes_every_listed_document() {
    let ctx = context();
    let id = ctx.jobs.create_job(None, JobType::Reindex, "reindex", "reindex", Default::default()).await.unwrap();
    let mut job = ctx.jobs.get_job(id).await.unwrap().unwrap();
    job.config.insert(
        "documents".to_string(),
        json!([{"document_id": "doc-1", "fields": {"title": "a"}}, {"document_id": "doc-2", "fields": {}}]),
    );

    let index = Arc::new(FakeSearchIndexClient::new());
    let manager = ReindexStepManager::new(index.clone());
    let result = manager.execute(&ctx, &job, id).await;

    assert!(result.success);
    assert_eq!(result.documents_produced, 2);
    assert_eq!(index.indexed_ids(), vec!["doc-1".to_string(), "doc-2".to_string()]);
}

#[tokio::test]
async fn missing_documents_fails_the_step() {
    let ctx = context();
    let id = ctx.jobs.create_job(None, JobType::Reindex, "reindex", "reindex", Default::default()).await.unwrap();
    let job = ctx.jobs.get_job(id).await.unwrap().unwrap();

    let manager = ReindexStepManager::new(Arc::new(FakeSearchIndexClient::new()));
    let result = manager.execute(&ctx, &job, id).await;
    assert!(!result.success);
}
