// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use super::*;

#[test]
fn event_serializes_with_tag_field() {
    let event = Event::JobStarted { job_id: JobId::from_string("job-abc"), started_at_epoch_ms: 10 };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "job_started");
    assert_eq!(json["started_at_epoch_ms"], 10);
}

#[test]
fn unknown_type_tag_deserializes_to_custom() {
    let json = serde_json::json!({"type": "something_new", "foo": 1});
    let event: Event = serde_json::from_value(json).unwrap();
    assert_eq!(event, Event::Custom);
}

#[test]
fn type_name_matches_wire_tag() {
    let event = Event::JobCancelled { job_id: JobId::new() };
    assert_eq!(event.type_name(), "job_cancelled");
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], event.type_name());
}

#[test]
fn for_status_transition_pending_yields_no_event() {
    assert!(Event::for_status_transition(
        JobId::new(),
        JobStatus::Pending,
        0,
        None,
        HashMap::new()
    )
    .is_none());
}

#[test]
fn for_status_transition_failed_carries_error_message() {
    let event =
        Event::for_status_transition(JobId::new(), JobStatus::Failed, 0, Some("boom"), HashMap::new())
            .unwrap();
    match event {
        Event::JobFailed { error, .. } => assert_eq!(error, "boom"),
        other => panic!("unexpected event: {other:?}"),
    }
}
