// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Places-search Step Manager (§4.6): calls an external location API and
//! stores the results in `result`.

use crate::step_manager::{StepContext, StepManager, StepResult};
use async_trait::async_trait;
use joborc_adapters::PlacesApiClient;
use joborc_core::{Clock, Job, JobId};
use serde_json::json;
use std::sync::Arc;

pub struct PlacesSearchStepManager {
    places_api: Arc<dyn PlacesApiClient>,
}

impl PlacesSearchStepManager {
    pub fn new(places_api: Arc<dyn PlacesApiClient>) -> Self {
        Self { places_api }
    }
}

#[async_trait]
impl<C: Clock> StepManager<C> for PlacesSearchStepManager {
    fn action(&self) -> &'static str {
        "places_search"
    }

    async fn execute(&self, _ctx: &StepContext<C>, job: &Job, root_id: JobId) -> StepResult {
        let Some(query) = job.config.get("query").and_then(|v| v.as_str()) else {
            return StepResult::failed("places_search job is missing `query` in config");
        };

        match self.places_api.search_places(query).await {
            Ok(places) => {
                let results: Vec<_> = places
                    .iter()
                    .map(|place| {
                        json!({
                            "place_id": place.place_id,
                            "name": place.name,
                            "address": place.address,
                            "latitude": place.latitude,
                            "longitude": place.longitude,
                        })
                    })
                    .collect();
                StepResult::ok([("places".to_string(), json!(results))].into())
            }
            Err(error) => {
                tracing::warn!(job_id = %root_id, %query, %error, "places search failed");
                StepResult::failed(error.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "places_search_tests.rs"]
mod tests;
