// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Concrete Step Managers (§4.6 "Specific managers"). Each wraps one
//! `joborc-adapters` collaborator trait and interprets one `action`.

mod agent;
mod crawl;
mod maintenance;
mod places_search;
mod reindex;
mod transform;

pub use agent::AgentStepManager;
pub use crawl::CrawlStepManager;
pub use maintenance::MaintenanceStepManager;
pub use places_search::PlacesSearchStepManager;
pub use reindex::ReindexStepManager;
pub use transform::TransformStepManager;
