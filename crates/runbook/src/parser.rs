// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Parses a Job Definition from its HCL source text.

use crate::definition::JobDefinition;
use crate::error::RunbookError;
use crate::topo::topological_order;

/// Parses and validates `source`, returning the definition if its
/// `depends_on` graph is well-formed (no unknown references, no cycles,
/// no duplicate step names). Does not create any job — that's the
/// Definition Orchestrator's responsibility (§4.8).
pub fn parse(source: &str) -> Result<JobDefinition, RunbookError> {
    let definition: JobDefinition = hcl::from_str(source).map_err(|e| RunbookError::Parse(e.to_string()))?;
    validate(&definition)?;
    Ok(definition)
}

/// Re-validates an already-parsed definition, e.g. after programmatic
/// construction in tests.
pub fn validate(definition: &JobDefinition) -> Result<(), RunbookError> {
    if definition.steps.is_empty() {
        return Err(RunbookError::EmptySteps);
    }
    topological_order(definition)?;
    Ok(())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
