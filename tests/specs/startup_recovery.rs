// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 6: 3 jobs left `running` by a killed process are marked
//! `pending` on restart, and once workers come back up they get
//! re-dispatched from messages that survived the crash in the queue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use joborc_core::{Job, JobId, JobStatus, JobType, QueueConfig, QueueMessage, SystemClock};
use joborc_engine::{EventBus, JobManager, JobProcessor, QueueManager, StepContext, StepManager, StepManagerRegistry, StepResult};
use joborc_storage::{InMemoryJobStorage, InMemoryMessageQueue};
use tokio::sync::watch;

use super::support::wait_until;

struct Noop;

#[async_trait]
impl StepManager<SystemClock> for Noop {
    fn action(&self) -> &'static str {
        "noop"
    }
    async fn execute(&self, _ctx: &StepContext<SystemClock>, _job: &Job, _root_id: JobId) -> StepResult {
        StepResult::ok(Default::default())
    }
}

#[tokio::test]
async fn orphaned_running_jobs_are_recovered_and_re_dispatched() {
    let storage = Arc::new(InMemoryJobStorage::new());
    let bus = EventBus::new();
    let jobs = Arc::new(JobManager::new(storage, bus.clone(), SystemClock));
    let queue = Arc::new(QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default()));

    let mut registry = StepManagerRegistry::new();
    registry.register(Arc::new(Noop));
    let processor = Arc::new(JobProcessor::new(jobs.clone(), queue.clone(), bus, Arc::new(registry)));

    // No workers yet: this models the window right after a crash, where
    // jobs are stuck `Running` and their dispatch messages are still
    // sitting in the (durable) queue, never deleted because the process
    // died before finishing them.
    let mut orphans = Vec::new();
    for i in 0..3 {
        let id = jobs
            .create_job(None, JobType::Step, "noop", format!("orphan-{i}"), Default::default())
            .await
            .unwrap();
        jobs.update_job_status(id, JobStatus::Running, None).await.unwrap();
        queue.enqueue(QueueMessage::new(id, "noop", 0)).await.unwrap();
        orphans.push(id);
    }

    let recovered = jobs.mark_running_jobs_as_pending("simulated restart").await.unwrap();
    assert_eq!(recovered, 3);
    for id in &orphans {
        let job = jobs.get_job(*id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
    }

    // "Restart": bring workers up now that recovery has run, and confirm
    // the orphaned messages actually get re-dispatched to completion.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let workers = processor.spawn_workers(2, shutdown_rx);

    let settled = wait_until(Duration::from_secs(5), || {
        let jobs = jobs.clone();
        let orphans = orphans.clone();
        async move {
            for id in &orphans {
                match jobs.get_job(*id).await.ok().flatten() {
                    Some(job) if job.status == JobStatus::Completed => continue,
                    _ => return false,
                }
            }
            true
        }
    })
    .await;
    assert!(settled, "all recovered jobs should re-dispatch and complete");

    let _ = shutdown_tx.send(true);
    for worker in workers {
        let _ = worker.await;
    }
}
