// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The agent Step Manager's collaborator for LLM completions (§1: external
//! collaborator, interface only).

use async_trait::async_trait;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub finish_reason: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AdapterError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;

    /// Returns `response` for every call, recording each request's prompt.
    pub struct FakeLlmClient {
        response: CompletionResponse,
        requests: Mutex<Vec<String>>,
    }

    impl FakeLlmClient {
        pub fn returning(text: impl Into<String>) -> Self {
            Self {
                response: CompletionResponse { text: text.into(), finish_reason: "stop".into() },
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl LlmClient for FakeLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AdapterError> {
            self.requests.lock().push(request.prompt);
            Ok(self.response.clone())
        }
    }
}

#[cfg(test)]
#[path = "llm_client_tests.rs"]
mod tests;
