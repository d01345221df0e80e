// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Reindex Step Manager (§4.6): replays stored documents into a search
//! index.

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_adapters::{IndexDocument, SearchIndexClient};
use joborc_core::{Clock, Job, JobId};
use serde_json::json;
use std::sync::Arc;

pub struct ReindexStepManager {
    search_index: Arc<dyn SearchIndexClient>,
}

impl ReindexStepManager {
    pub fn new(search_index: Arc<dyn SearchIndexClient>) -> Self {
        Self { search_index }
    }
}

#[async_trait]
impl<C: Clock> StepManager<C> for ReindexStepManager {
    fn action(&self) -> &'static str {
        "reindex"
    }

    async fn execute(&self, _ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let Some(documents) = job.config.get("documents").and_then(|v| v.as_array()) else {
            return StepResult::failed("reindex job is missing `documents` in config");
        };

        let mut indexed = 0;
        for entry in documents {
            let Some(document_id) = entry.get("document_id").and_then(|v| v.as_str()) else {
                continue;
            };
            let fields = entry.get("fields").and_then(|v| v.as_object()).cloned().unwrap_or_default().into_iter().collect();
            let document = IndexDocument { document_id: document_id.to_string(), fields };
            match self.search_index.index_document(document).await {
                Ok(()) => indexed += 1,
                Err(error) => tracing::warn!(job_id = %root_id, %document_id, %error, "failed to index document"),
            }
        }

        StepResult {
            success: true,
            children_spawned: 0,
            documents_produced: indexed,
            error: None,
            result_payload: [("indexed".to_string(), json!(indexed))].into(),
        }
    }
}

#[cfg(test)]
#[path = "reindex_tests.rs"]
mod tests;
