// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Daemon lifecycle: wires storage, the event bus, and the orchestration
//! engine together, then starts the Job Processor's worker pool and the
//! Log Consumer / Status Service background tasks.
//!
//! Unlike the teacher's WAL/snapshot-backed lifecycle, `joborc-storage` is
//! in-memory only (see DESIGN.md) — there is nothing to replay at startup,
//! so recovery is just `MarkRunningJobsAsPending` (§8 property 7).

use std::sync::Arc;

use joborc_core::{Clock, SystemClock};
use joborc_engine::{
    DefinitionOrchestrator, EventBus, JobManager, JobProcessor, LogBatch, LogConsumer, LogService, QueueManager,
    StatusService, StepManagerRegistry,
};
use joborc_storage::{InMemoryJobStorage, InMemoryLogStorage, InMemoryMessageQueue};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::control;
use crate::error::DaemonError;

/// The production daemon always runs against the real clock; tests build
/// `Daemon<FakeClock>` directly via [`Daemon::start`].
pub type JoborcDaemon = Daemon<SystemClock>;

/// Everything the daemon needs once it is up: the handles `http.rs` reads
/// from, plus the background task handles `shutdown` waits on.
pub struct Daemon<C: Clock> {
    pub config: Config,
    pub jobs: Arc<JobManager<C>>,
    pub queue: Arc<QueueManager>,
    pub bus: EventBus,
    pub log_service: Arc<LogService>,
    pub orchestrator: Arc<DefinitionOrchestrator<C>>,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
    background: Vec<JoinHandle<()>>,
}

impl<C: Clock + 'static> Daemon<C> {
    /// Wires storage, the engine, and the worker pool, using `clock` for
    /// every clock-dependent component and `log_batches` as the Log
    /// Consumer's input (built by [`crate::logging::init`]). Recovery runs
    /// before the worker pool starts so no worker can race a job still
    /// marked `running` from a previous process.
    pub async fn start(config: Config, clock: C, registry: StepManagerRegistry<C>, log_batches: mpsc::Receiver<LogBatch>) -> Result<Self, DaemonError> {
        let job_storage = Arc::new(InMemoryJobStorage::new());
        let log_storage = Arc::new(InMemoryLogStorage::new());
        let message_queue = Arc::new(InMemoryMessageQueue::new());
        let bus = EventBus::new();

        let jobs = Arc::new(JobManager::new(job_storage.clone(), bus.clone(), clock));
        let recovered = jobs.mark_running_jobs_as_pending("daemon startup").await?;
        if recovered > 0 {
            tracing::warn!(recovered, "startup recovery: marked previously running jobs pending");
        }

        let queue = Arc::new(QueueManager::new(message_queue, &config.queue));
        let log_service = Arc::new(LogService::new(job_storage, log_storage.clone()));
        let registry = Arc::new(registry);
        let orchestrator = Arc::new(DefinitionOrchestrator::new(jobs.clone(), queue.clone()));

        let log_consumer = Arc::new(LogConsumer::new(log_storage, bus.clone(), config.logging.min_event_level.as_log_level()));
        let log_consumer_handle = tokio::spawn(async move {
            log_consumer.run(log_batches).await;
        });

        let status_service = Arc::new(StatusService::new(jobs.clone(), bus.clone()));
        let status_service_handle = tokio::spawn(async move {
            status_service.run().await;
        });

        let processor = Arc::new(JobProcessor::new(jobs.clone(), queue.clone(), bus.clone(), registry));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = processor.spawn_workers(config.queue.worker_pool_size, shutdown_rx.clone());

        let control_listener = control::bind(&config.socket_path)?;
        let control_socket_path = config.socket_path.clone();
        let control_orchestrator = orchestrator.clone();
        let control_handle = tokio::spawn(control::serve(control_listener, control_socket_path, control_orchestrator, shutdown_rx));

        Ok(Self {
            config,
            jobs,
            queue,
            bus,
            log_service,
            orchestrator,
            shutdown_tx,
            workers,
            background: vec![log_consumer_handle, status_service_handle, control_handle],
        })
    }

    /// Signals every worker to stop after its current message, then waits
    /// for the pool and background tasks to drain.
    pub async fn shutdown(self) {
        tracing::info!("shutting down daemon");
        let _ = self.shutdown_tx.send(true);
        for worker in self.workers {
            let _ = worker.await;
        }
        drop(self.bus);
        for task in self.background {
            let _ = task.await;
        }
        tracing::info!("daemon shutdown complete");
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
