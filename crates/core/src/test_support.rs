// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::job::{Job, JobType};
use crate::{JobId, JsonMap};

/// Proptest strategies for core state machine types, shared by property
/// tests in `joborc-engine` (counter invariant, log ordering).
pub mod strategies {
    use crate::job::{CountersDelta, JobStatus};
    use proptest::prelude::*;

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Pending),
            Just(JobStatus::Running),
            Just(JobStatus::Completed),
            Just(JobStatus::Failed),
            Just(JobStatus::Cancelled),
        ]
    }

    /// One of the well-formed deltas a Step Manager or Job Processor would
    /// actually apply — arbitrary signed deltas would violate the counter
    /// invariant by construction, which is not what we're testing.
    pub fn arb_well_formed_delta() -> impl Strategy<Value = CountersDelta> {
        prop_oneof![
            Just(CountersDelta::spawn_child()),
            Just(CountersDelta::pending_to_running()),
            Just(CountersDelta::child_completed()),
            Just(CountersDelta::child_failed()),
            Just(CountersDelta::child_cancelled()),
        ]
    }
}

/// A minimal root job for tests that don't care about most fields.
pub fn test_root_job(name: &str) -> Job {
    Job::new(JobId::new(), None, JobType::Root, "noop", name, JsonMap::new(), 0)
}

/// A child job under `parent` with the given action.
pub fn test_child_job(parent: JobId, job_type: JobType, action: &str, now_ms: u64) -> Job {
    Job::new(JobId::new(), Some(parent), job_type, action, action, JsonMap::new(), now_ms)
}
