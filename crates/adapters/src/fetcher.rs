// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The crawl Step Manager's collaborator for retrieving a single page
//! (§1: external collaborator, interface only).

use async_trait::async_trait;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: String,
    pub body: String,
    /// Links discovered on the page, used by the crawl Step Manager to
    /// decide what to spawn next (subject to depth/scope limits it owns).
    pub links: Vec<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, AdapterError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Returns a canned [`FetchedPage`] per url, recording every call made
    /// to it so tests can assert on fetch order/count.
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: Mutex<HashMap<String, FetchedPage>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(self, url: impl Into<String>, page: FetchedPage) -> Self {
            self.pages.lock().insert(url.into(), page);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, AdapterError> {
            self.calls.lock().push(url.to_string());
            self.pages.lock().get(url).cloned().ok_or_else(|| AdapterError::RequestFailed {
                collaborator: "fetcher",
                message: format!("no fake page registered for {url}"),
            })
        }
    }
}

#[cfg(test)]
#[path = "fetcher_tests.rs"]
mod tests;
