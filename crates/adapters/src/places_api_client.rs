// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The places_search Step Manager's collaborator for resolving place
//! records (§1: external collaborator, interface only).

use async_trait::async_trait;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait PlacesApiClient: Send + Sync {
    async fn search_places(&self, query: &str) -> Result<Vec<PlaceResult>, AdapterError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    pub struct FakePlacesApiClient {
        results: Mutex<HashMap<String, Vec<PlaceResult>>>,
    }

    impl FakePlacesApiClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_results(self, query: impl Into<String>, results: Vec<PlaceResult>) -> Self {
            self.results.lock().insert(query.into(), results);
            self
        }
    }

    #[async_trait]
    impl PlacesApiClient for FakePlacesApiClient {
        async fn search_places(&self, query: &str) -> Result<Vec<PlaceResult>, AdapterError> {
            Ok(self.results.lock().get(query).cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
#[path = "places_api_client_tests.rs"]
mod tests;
