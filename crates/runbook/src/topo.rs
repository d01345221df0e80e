// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Topological ordering of a [`JobDefinition`]'s steps by `depends_on`
//! (§4.8: "For each step, in topological order of `depends_on`").

use std::collections::{HashMap, VecDeque};

use crate::definition::{JobDefinition, Step};
use crate::error::RunbookError;

/// Returns the definition's steps in an order where every step appears
/// after all the steps it `depends_on`. Kahn's algorithm so that, among
/// several valid orders, the one returned is deterministic for a given
/// input (ties broken by original declaration order).
pub fn topological_order(definition: &JobDefinition) -> Result<Vec<&Step>, RunbookError> {
    let index = definition.step_index();

    let mut seen_names = std::collections::HashSet::new();
    for step in &definition.steps {
        if !seen_names.insert(step.name.as_str()) {
            return Err(RunbookError::DuplicateStepName(step.name.clone()));
        }
    }

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for step in &definition.steps {
        in_degree.entry(step.name.as_str()).or_insert(0);
        for dep in &step.depends_on {
            if !index.contains_key(dep.as_str()) {
                return Err(RunbookError::UnknownDependency(step.name.clone(), dep.clone()));
            }
            *in_degree.entry(step.name.as_str()).or_insert(0) += 1;
            dependents.entry(dep.as_str()).or_default().push(step.name.as_str());
        }
    }

    let mut queue: VecDeque<&str> = definition
        .steps
        .iter()
        .map(|s| s.name.as_str())
        .filter(|name| in_degree[name] == 0)
        .collect();

    let mut ordered_names = Vec::with_capacity(definition.steps.len());
    while let Some(name) = queue.pop_front() {
        ordered_names.push(name);
        if let Some(deps) = dependents.get(name) {
            for &dependent in deps {
                let degree = in_degree.get_mut(dependent).expect("in_degree tracked for every step");
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }
    }

    if ordered_names.len() != definition.steps.len() {
        let stuck = definition
            .steps
            .iter()
            .find(|s| !ordered_names.contains(&s.name.as_str()))
            .expect("at least one step remains unordered when a cycle exists");
        return Err(RunbookError::DependencyCycle(stuck.name.clone()));
    }

    Ok(ordered_names.into_iter().map(|name| &definition.steps[index[name]]).collect())
}

#[cfg(test)]
#[path = "topo_tests.rs"]
mod tests;
