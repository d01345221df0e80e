// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;
use joborc_core::SystemClock;
use joborc_storage::InMemoryJobStorage;

fn manager() -> (JobManager<SystemClock>, EventBus) {
    let storage = Arc::new(InMemoryJobStorage::new());
    let bus = EventBus::new();
    (JobManager::new(storage, bus.clone(), SystemClock), bus)
}

#[tokio::test]
async fn create_job_publishes_job_created() {
    let (manager, bus) = manager();
    let mut sub = bus.subscribe();

    let id = manager.create_job(None, JobType::Root, "noop", "root", JsonMap::new()).await.unwrap();

    match sub.recv().await.unwrap() {
        Event::JobCreated { job_id, parent_id, .. } => {
            assert_eq!(job_id, id);
            assert!(parent_id.is_none());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn update_job_status_to_running_publishes_job_started() {
    let (manager, bus) = manager();
    let id = manager.create_job(None, JobType::Root, "noop", "root", JsonMap::new()).await.unwrap();
    let mut sub = bus.subscribe();

    let changed = manager.update_job_status(id, JobStatus::Running, None).await.unwrap();
    assert!(changed);
    assert!(matches!(sub.recv().await.unwrap(), Event::JobStarted { .. }));
}

#[tokio::test]
async fn repeating_a_terminal_status_is_a_no_op() {
    let (manager, _bus) = manager();
    let id = manager.create_job(None, JobType::Root, "noop", "root", JsonMap::new()).await.unwrap();
    manager.update_job_status(id, JobStatus::Running, None).await.unwrap();
    manager.update_job_status(id, JobStatus::Completed, None).await.unwrap();

    let changed = manager.update_job_status(id, JobStatus::Completed, None).await.unwrap();
    assert!(!changed);
}

#[tokio::test]
async fn counter_update_publishes_job_progress_with_the_post_update_counters() {
    let (manager, bus) = manager();
    let id = manager.create_job(None, JobType::Root, "noop", "root", JsonMap::new()).await.unwrap();
    let mut sub = bus.subscribe();

    let counters = manager.update_progress_counters_atomic(id, CountersDelta::spawn_child()).await.unwrap();
    assert_eq!(counters.total_children, 1);
    match sub.recv().await.unwrap() {
        Event::JobProgress { counters: published, .. } => assert_eq!(published.total_children, 1),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn mark_running_jobs_as_pending_clears_every_running_job() {
    let (manager, _bus) = manager();
    let a = manager.create_job(None, JobType::Root, "noop", "a", JsonMap::new()).await.unwrap();
    let b = manager.create_job(None, JobType::Root, "noop", "b", JsonMap::new()).await.unwrap();
    manager.update_job_status(a, JobStatus::Running, None).await.unwrap();
    manager.update_job_status(b, JobStatus::Running, None).await.unwrap();

    let count = manager.mark_running_jobs_as_pending("restart").await.unwrap();
    assert_eq!(count, 2);
    assert_eq!(manager.get_job(a).await.unwrap().unwrap().status, JobStatus::Pending);
    assert_eq!(manager.get_job(b).await.unwrap().unwrap().status, JobStatus::Pending);
}
