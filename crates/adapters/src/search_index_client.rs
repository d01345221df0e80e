// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The reindex Step Manager's collaborator for pushing documents to the
//! search index (§1: external collaborator, interface only).

use async_trait::async_trait;
use joborc_core::JsonMap;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct IndexDocument {
    pub document_id: String,
    pub fields: JsonMap,
}

#[async_trait]
pub trait SearchIndexClient: Send + Sync {
    async fn index_document(&self, document: IndexDocument) -> Result<(), AdapterError>;
    async fn delete_document(&self, document_id: &str) -> Result<(), AdapterError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    #[derive(Default)]
    pub struct FakeSearchIndexClient {
        indexed: Mutex<HashSet<String>>,
    }

    impl FakeSearchIndexClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn indexed_ids(&self) -> Vec<String> {
            let mut ids: Vec<_> = self.indexed.lock().iter().cloned().collect();
            ids.sort();
            ids
        }
    }

    #[async_trait]
    impl SearchIndexClient for FakeSearchIndexClient {
        async fn index_document(&self, document: IndexDocument) -> Result<(), AdapterError> {
            self.indexed.lock().insert(document.document_id);
            Ok(())
        }

        async fn delete_document(&self, document_id: &str) -> Result<(), AdapterError> {
            self.indexed.lock().remove(document_id);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "search_index_client_tests.rs"]
mod tests;
