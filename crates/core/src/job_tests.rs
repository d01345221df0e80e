// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use proptest::prelude::*;

use super::*;

#[test]
fn new_job_starts_pending_with_no_timestamps_set() {
    let job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.started_at_epoch_ms.is_none());
    assert!(job.completed_at_epoch_ms.is_none());
    assert!(job.is_root());
}

#[test]
fn transition_pending_to_running_sets_started_and_heartbeat() {
    let mut job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    let changed = job.transition(JobStatus::Running, 200, None).unwrap();
    assert!(changed);
    assert_eq!(job.started_at_epoch_ms, Some(200));
    assert_eq!(job.heartbeat_at_epoch_ms, Some(200));
}

#[test]
fn transition_running_to_failed_sets_completed_at_and_error() {
    let mut job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    job.transition(JobStatus::Running, 200, None).unwrap();
    job.transition(JobStatus::Failed, 300, Some("boom".into())).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.completed_at_epoch_ms, Some(300));
    assert_eq!(job.error_message.as_deref(), Some("boom"));
}

#[test]
fn illegal_transition_is_rejected() {
    let mut job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    // pending -> completed directly is not allowed
    let err = job.transition(JobStatus::Completed, 200, None).unwrap_err();
    assert!(matches!(err, JobStatusError::IllegalTransition { .. }));
}

#[test]
fn repeated_terminal_transition_is_idempotent_no_op() {
    let mut job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    job.transition(JobStatus::Running, 200, None).unwrap();
    assert!(job.transition(JobStatus::Completed, 300, None).unwrap());
    // second call is a documented no-op (§8 idempotence law)
    assert!(!job.transition(JobStatus::Completed, 400, None).unwrap());
    assert_eq!(job.completed_at_epoch_ms, Some(300));
}

#[test]
fn transition_out_of_terminal_state_is_rejected() {
    let mut job = Job::new(JobId::new(), None, JobType::Root, "noop", "root", JsonMap::new(), 100);
    job.transition(JobStatus::Running, 200, None).unwrap();
    job.transition(JobStatus::Cancelled, 300, None).unwrap();
    let err = job.transition(JobStatus::Running, 400, None).unwrap_err();
    assert!(matches!(err, JobStatusError::IllegalTransition { .. }));
}

// --- Counters ---

#[test]
fn counters_default_is_consistent() {
    assert!(Counters::default().is_consistent());
}

#[test]
fn counters_apply_delta_keeps_invariant() {
    let mut c = Counters::default();
    c.apply(CountersDelta::spawn_child());
    c.apply(CountersDelta::spawn_child());
    assert_eq!(c.total_children, 2);
    assert_eq!(c.pending_children, 2);
    assert!(c.is_consistent());

    c.apply(CountersDelta::pending_to_running());
    c.apply(CountersDelta::child_completed());
    assert!(c.is_consistent());
    assert_eq!(c.completed_children, 1);
    assert_eq!(c.pending_children, 1);
}

#[test]
fn all_children_terminal_requires_at_least_one_child() {
    let c = Counters::default();
    assert!(!c.all_children_terminal());
}

#[test]
fn all_children_terminal_true_once_pending_and_running_drain() {
    let mut c = Counters::default();
    c.apply(CountersDelta::spawn_child());
    c.apply(CountersDelta::pending_to_running());
    assert!(!c.all_children_terminal());
    c.apply(CountersDelta::child_completed());
    assert!(c.all_children_terminal());
}

#[test]
fn zero_delta_is_a_documented_no_op() {
    let delta = CountersDelta::default();
    assert!(delta.is_noop());
    let mut c = Counters::default();
    let before = c;
    c.apply(delta);
    assert_eq!(before, c);
}

#[cfg(feature = "test-support")]
#[test]
fn job_builder_produces_sane_defaults() {
    let job = Job::builder().name("crawl-step").action("crawl").build();
    assert_eq!(job.name, "crawl-step");
    assert_eq!(job.action, "crawl");
    assert_eq!(job.status, JobStatus::Pending);
}

#[derive(Debug, Clone, Copy)]
enum ChildOp {
    Spawn,
    Running,
    Completed,
    Failed,
    Cancelled,
}

fn arb_child_op() -> impl Strategy<Value = ChildOp> {
    prop_oneof![
        Just(ChildOp::Spawn),
        Just(ChildOp::Running),
        Just(ChildOp::Completed),
        Just(ChildOp::Failed),
        Just(ChildOp::Cancelled),
    ]
}

proptest! {
    // §8 property 1: no matter what sequence of child lifecycle events
    // lands, `total_children` always equals the sum of the per-status
    // buckets — each op below is only applied when it's legal for the
    // bucket it draws from, same as callers are expected to.
    #[test]
    fn counters_stay_consistent_under_any_legal_op_sequence(ops in prop::collection::vec(arb_child_op(), 0..200)) {
        let mut c = Counters::default();
        prop_assert!(c.is_consistent());
        for op in ops {
            let delta = match op {
                ChildOp::Spawn => CountersDelta::spawn_child(),
                ChildOp::Running if c.pending_children > 0 => CountersDelta::pending_to_running(),
                ChildOp::Completed if c.running_children > 0 => CountersDelta::child_completed(),
                ChildOp::Failed if c.running_children > 0 => CountersDelta::child_failed(),
                ChildOp::Cancelled if c.pending_children > 0 => CountersDelta::child_cancelled(),
                _ => continue,
            };
            c.apply(delta);
            prop_assert!(c.is_consistent());
        }
        if c.total_children > 0 && c.pending_children == 0 && c.running_children == 0 {
            prop_assert!(c.all_children_terminal());
        }
    }
}
