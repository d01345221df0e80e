// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Shared fixtures for the end-to-end scenario tests: a full in-memory
//! orchestrator stack (`JobManager` + `QueueManager` + `JobProcessor`
//! workers) that can be spun up, driven to a fixed point, and torn down.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use joborc_core::{QueueConfig, SystemClock};
use joborc_engine::{EventBus, JobManager, JobProcessor, QueueManager, StepManagerRegistry};
use joborc_storage::{InMemoryJobStorage, InMemoryMessageQueue};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Harness {
    pub jobs: Arc<JobManager<SystemClock>>,
    pub queue: Arc<QueueManager>,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl Harness {
    /// Build the stack and start `worker_count` processor workers.
    pub fn spawn(registry: StepManagerRegistry<SystemClock>, worker_count: usize) -> Self {
        let storage = Arc::new(InMemoryJobStorage::new());
        let bus = EventBus::new();
        let jobs = Arc::new(JobManager::new(storage, bus.clone(), SystemClock));
        let queue = Arc::new(QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default()));
        let processor = Arc::new(JobProcessor::new(jobs.clone(), queue.clone(), bus, Arc::new(registry)));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = processor.spawn_workers(worker_count, shutdown_rx);
        Self { jobs, queue, shutdown_tx, workers }
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Poll `check` until it returns `true` or `max_wait` elapses. Returns
/// whether the condition was observed.
pub async fn wait_until<F, Fut>(max_wait: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + max_wait;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
