// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;
use crate::event_bus::EventBus;
use crate::job_manager::JobManager;
use crate::queue_manager::QueueManager;
use joborc_adapters::fakes::FakePlacesApiClient;
use joborc_adapters::PlaceResult;
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
async fn stores_search_results_in_the_result_payload() {
    let ctx = context();
    let id = ctx.jobs.create_job(None, JobType::PlacesSearch, "places_search", "places", Default::default()).await.unwrap();
    let mut job = ctx.jobs.get_job(id).await.unwrap().unwrap();
    job.config.insert("query".to_string(), json!("coffee near me"));

    let places = FakePlacesApiClient::new().with_results(
        "coffee near me",
        vec![PlaceResult { place_id: "p1".into(), name: "Cafe".into(), address: "123 Main".into(), latitude: 1.0, longitude: 2.0 }],
    );
    let manager = PlacesSearchStepManager::new(Arc::new(places));
    let result = manager.execute(&ctx, &job, id).await;

    assert!(result.success);
    let places = result.result_payload.get("places").unwrap().as_array().unwrap();
    assert_eq!(places.len(), 1);
}

#[tokio::test]
async fn missing_query_fails_the_step() {
    let ctx = context();
    let id = ctx.jobs.create_job(None, JobType::PlacesSearch, "places_search", "places", Default::default()).await.unwrap();
    let job = ctx.jobs.get_job(id).await.unwrap().unwrap();

    let manager = PlacesSearchStepManager::new(Arc::new(FakePlacesApiClient::new()));
    let result = manager.execute(&ctx, &job, id).await;
    assert!(!result.success);
}
