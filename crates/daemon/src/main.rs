// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Binary entry point: loads configuration, installs logging, starts the
//! daemon's worker pool, and serves the read API until `SIGINT`.

use std::sync::Arc;

use joborc_adapters::fakes::{FakeFetcher, FakeLlmClient, FakePlacesApiClient, FakeSearchIndexClient};
use joborc_core::SystemClock;
use joborc_daemon::http::{router, ApiState};
use joborc_daemon::{Config, Daemon};
use joborc_engine::{
    AgentStepManager, CrawlStepManager, MaintenanceStepManager, PlacesSearchStepManager, ReindexStepManager,
    StepManagerRegistry, TransformStepManager,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let log_batches = joborc_daemon::logging::init(&config.log_path);

    // Real crawler/LLM/search-index backends are outside this orchestrator's
    // scope; the fakes exercise the full pipeline against the adapter
    // boundary until a deployment wires in a production implementation.
    let mut registry = StepManagerRegistry::<SystemClock>::new();
    registry.register(Arc::new(CrawlStepManager::new(Arc::new(FakeFetcher::new()))));
    registry.register(Arc::new(TransformStepManager));
    registry.register(Arc::new(AgentStepManager::new(Arc::new(FakeLlmClient::returning("")))));
    registry.register(Arc::new(ReindexStepManager::new(Arc::new(FakeSearchIndexClient::new()))));
    registry.register(Arc::new(PlacesSearchStepManager::new(Arc::new(FakePlacesApiClient::new()))));
    registry.register(Arc::new(MaintenanceStepManager));

    let http_addr = config.http_addr.clone();
    let daemon = Daemon::start(config, SystemClock, registry, log_batches).await?;

    let state = ApiState { jobs: daemon.jobs.clone(), log_service: daemon.log_service.clone() };
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!(addr = %http_addr, "read API listening");

    let server = axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal());
    server.await?;

    daemon.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received ctrl-c, shutting down");
}
