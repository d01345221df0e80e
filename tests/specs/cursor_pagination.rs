// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 3: 50 log entries, paginated 20 at a time, end with a
//! final short page and no cursor.

use std::collections::HashMap;
use std::sync::Arc;

use joborc_core::{Job, JobType, LogEntry, LogLevel, Sequence};
use joborc_engine::LogService;
use joborc_storage::{InMemoryJobStorage, InMemoryLogStorage};
use joborc_wire::LogOrder;

fn entry(job_id: joborc_core::JobId, n: u32) -> LogEntry {
    let full_timestamp = format!("2026-01-01T00:00:00.{n:09}Z");
    LogEntry {
        associated_job_id: job_id,
        sequence: Sequence::next(&full_timestamp),
        full_timestamp,
        timestamp: format!("00:00:00.{n:03}"),
        level: LogLevel::Inf,
        message: format!("line-{n}"),
        context: HashMap::new(),
    }
}

#[tokio::test]
async fn fifty_entries_paginate_twenty_twenty_ten() {
    let jobs = Arc::new(InMemoryJobStorage::new());
    let logs = Arc::new(InMemoryLogStorage::new());
    let root: Job = Job::builder().job_type(JobType::Root).name("root").build();
    let root_id = root.id;
    jobs.save_job(root).await.unwrap();
    for n in 0..50 {
        logs.append_log(entry(root_id, n)).await.unwrap();
    }

    let service = LogService::new(jobs, logs);

    let first = service.get_aggregated_logs(root_id, false, None, 20, None, LogOrder::Asc).await.unwrap();
    assert_eq!(first.logs.len(), 20);
    assert_eq!(first.logs.first().unwrap().message, "line-0");
    let cursor = first.next_cursor.clone().expect("20 of 50 leaves more");

    let second = service.get_aggregated_logs(root_id, false, None, 20, Some(cursor), LogOrder::Asc).await.unwrap();
    assert_eq!(second.logs.len(), 20);
    assert_eq!(second.logs.first().unwrap().message, "line-20");
    let cursor = second.next_cursor.clone().expect("40 of 50 leaves more");

    let third = service.get_aggregated_logs(root_id, false, None, 20, Some(cursor), LogOrder::Asc).await.unwrap();
    assert_eq!(third.logs.len(), 10);
    assert_eq!(third.logs.first().unwrap().message, "line-40");
    assert!(third.next_cursor.is_none());
}
