// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Agent Step Manager (§4.6): invokes an LLM with a document and a prompt,
//! storing its structured response in `result`.

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_adapters::{CompletionRequest, LlmClient};
use joborc_core::{Clock, Job, JobId};
use serde_json::json;
use std::sync::Arc;

pub struct AgentStepManager {
    llm: Arc<dyn LlmClient>,
}

impl AgentStepManager {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl<C: Clock> StepManager<C> for AgentStepManager {
    fn action(&self) -> &'static str {
        "agent"
    }

    async fn execute(&self, _ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let Some(prompt) = job.config.get("prompt").and_then(|v| v.as_str()) else {
            return StepResult::failed("agent job is missing `prompt` in config");
        };
        let document = job.config.get("document").and_then(|v| v.as_str()).unwrap_or_default();
        let model = job.config.get("model").and_then(|v| v.as_str()).unwrap_or("default").to_string();

        let request = CompletionRequest { prompt: format!("{prompt}\n\n{document}"), model };
        match self.llm.complete(request).await {
            Ok(response) => StepResult::ok(
                [
                    ("text".to_string(), json!(response.text)),
                    ("finish_reason".to_string(), json!(response.finish_reason)),
                ]
                .into(),
            ),
            Err(error) => {
                tracing::warn!(job_id = %root_id, %error, "agent completion failed");
                StepResult::failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
