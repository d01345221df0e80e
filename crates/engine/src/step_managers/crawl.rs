// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Crawl Step Manager (§4.6): fetches pages and spawns a child per newly
//! discovered link, up to `max_depth`.

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_adapters::Fetcher;
use joborc_core::{Clock, Job, JobId, JobType};
use serde_json::json;
use std::sync::Arc;

pub struct CrawlStepManager {
    fetcher: Arc<dyn Fetcher>,
}

impl CrawlStepManager {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

/// A job either carries an explicit `seed_urls` list (the step job created
/// by the Definition Orchestrator) or a single `url`/`depth` pair (a child
/// spawned by a previous crawl). Both shapes are handled the same way.
fn frontier(job: &Job) -> Vec<(String, u32)> {
    if let Some(seeds) = job.config.get("seed_urls").and_then(|v| v.as_array()) {
        return seeds.iter().filter_map(|v| v.as_str()).map(|url| (url.to_string(), 0)).collect();
    }
    if let Some(url) = job.config.get("url").and_then(|v| v.as_str()) {
        let depth = job.config.get("depth").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        return vec![(url.to_string(), depth)];
    }
    Vec::new()
}

fn passes_filters(url: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|f| url.contains(f.as_str()))
}

#[async_trait]
impl<C: Clock> StepManager<C> for CrawlStepManager {
    fn action(&self) -> &'static str {
        "crawl"
    }

    async fn execute(&self, ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let max_depth = job.config.get("max_depth").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        let filters: Vec<String> = job
            .config
            .get("filters")
            .and_then(|v| v.as_array())
            .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        // The step job that owns this whole crawl, whether `job` is that
        // step job itself or a worker several links deep into its frontier.
        let manager_id = job.manager_id.or(Some(job.id));

        let mut documents_produced = 0;
        let mut children_spawned = 0;

        for (url, depth) in frontier(job) {
            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(job_id = %root_id, %url, %error, "crawl fetch failed");
                    continue;
                }
            };
            documents_produced += 1;

            if depth >= max_depth {
                continue;
            }
            for link in &page.links {
                if !passes_filters(link, &filters) {
                    continue;
                }
                let config = [("url".to_string(), json!(link)), ("depth".to_string(), json!(depth + 1))].into();
                match ctx
                    .spawn_child(
                        job.id,
                        manager_id,
                        JobType::Crawler,
                        "crawl",
                        link.clone(),
                        config,
                        "crawl",
                        Some(link.clone()),
                        Some(depth + 1),
                    )
                    .await
                {
                    Ok(_) => children_spawned += 1,
                    Err(error) => tracing::warn!(job_id = %root_id, %link, %error, "failed to spawn crawl child"),
                }
            }
        }

        StepResult { success: true, children_spawned, documents_produced, error: None, result_payload: Default::default() }
    }
}

#[cfg(test)]
#[path = "crawl_tests.rs"]
mod tests;
