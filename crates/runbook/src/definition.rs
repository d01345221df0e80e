// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The user-authored Job Definition (§3.5).

use indexmap::IndexMap;
use joborc_core::{JobType, JsonMap};
use serde::{Deserialize, Serialize};

/// What to do when a step fails (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Stop,
    Continue,
    MarkWarning,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Stop
    }
}

/// One step of a [`JobDefinition`] (§3.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    pub action: String,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(default)]
    pub on_error: OnError,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// The UI-facing category a definition declares itself as; translated to
/// the technically accurate [`JobType`] the Definition Orchestrator uses
/// for the root job (§3.5, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionType {
    Crawl,
    Ai,
    Reindex,
    PlacesSearch,
    Maintenance,
}

impl DefinitionType {
    /// §4.8: "translating the UI type to the execution type — e.g., `ai -> agent`".
    pub fn to_job_type(self) -> JobType {
        match self {
            DefinitionType::Crawl => JobType::Crawler,
            DefinitionType::Ai => JobType::Agent,
            DefinitionType::Reindex => JobType::Reindex,
            DefinitionType::PlacesSearch => JobType::PlacesSearch,
            DefinitionType::Maintenance => JobType::Maintenance,
        }
    }
}

/// A user-authored multi-step workflow template (§3.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub definition_type: DefinitionType,
    #[serde(default)]
    pub description: String,
    /// Descriptive only: this core has no scheduler component (§1 scope).
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub auth_id: Option<String>,
    #[serde(default)]
    pub config: JsonMap,
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

fn default_enabled() -> bool {
    true
}

impl JobDefinition {
    /// Looks up a step's index by name; used by topological sort and by
    /// validation to resolve `depends_on` references.
    pub fn step_index(&self) -> IndexMap<&str, usize> {
        self.steps.iter().enumerate().map(|(i, s)| (s.name.as_str(), i)).collect()
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
