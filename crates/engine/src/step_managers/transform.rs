// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Transform Step Manager (§4.6): converts fetched content (HTML to
//! Markdown) and bumps `document_count` per output. No external
//! collaborator — conversion is pure, in-process text processing.

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_core::{Clock, Job, JobId};
use serde_json::json;

pub struct TransformStepManager;

/// A deliberately minimal HTML-to-Markdown pass: strips tags and collapses
/// whitespace. Good enough for this system's purposes — a real renderer
/// is an external collaborator this step doesn't have.
fn html_to_markdown(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[async_trait]
impl<C: Clock> StepManager<C> for TransformStepManager {
    fn action(&self) -> &'static str {
        "transform"
    }

    async fn execute(&self, ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let Some(html) = job.config.get("html").and_then(|v| v.as_str()) else {
            return StepResult::failed("transform job is missing `html` in config");
        };

        let markdown = html_to_markdown(html);
        if let Err(error) = ctx.jobs.increment_document_count_atomic(job.id).await {
            tracing::warn!(job_id = %root_id, %error, "failed to bump document count");
        }

        StepResult {
            success: true,
            children_spawned: 0,
            documents_produced: 1,
            error: None,
            result_payload: [("markdown".to_string(), json!(markdown))].into(),
        }
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
