// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 2: two workers under one root emit 100 interleaved logs
//! each; the aggregated, ascending-order view returns exactly 200 entries,
//! each worker's own entries still in the order it wrote them.

use std::collections::HashMap;
use std::sync::Arc;

use joborc_core::{Job, JobId, JobType, LogEntry, LogLevel, Sequence};
use joborc_engine::LogService;
use joborc_storage::{InMemoryJobStorage, InMemoryLogStorage};
use joborc_wire::LogOrder;

fn entry(job_id: JobId, n: u32, worker: &str) -> LogEntry {
    let full_timestamp = format!("2026-01-01T00:00:00.{n:09}Z");
    LogEntry {
        associated_job_id: job_id,
        sequence: Sequence::next(&full_timestamp),
        full_timestamp,
        timestamp: format!("00:00:00.{n:03}"),
        level: LogLevel::Inf,
        message: format!("{worker}-{n:03}"),
        context: HashMap::new(),
    }
}

#[tokio::test]
async fn two_hundred_interleaved_entries_come_back_with_each_workers_order_preserved() {
    let jobs = Arc::new(InMemoryJobStorage::new());
    let logs = Arc::new(InMemoryLogStorage::new());

    let root: Job = Job::builder().job_type(JobType::Root).name("root").build();
    let root_id = root.id;
    jobs.save_job(root).await.unwrap();

    let worker_a: Job = Job::builder().job_type(JobType::Crawler).parent_id(root_id).name("worker-a").build();
    let worker_b: Job = Job::builder().job_type(JobType::Crawler).parent_id(root_id).name("worker-b").build();
    let worker_a_id = worker_a.id;
    let worker_b_id = worker_b.id;
    jobs.save_job(worker_a).await.unwrap();
    jobs.save_job(worker_b).await.unwrap();

    let logs_a = logs.clone();
    let logs_b = logs.clone();
    let task_a = tokio::spawn(async move {
        for n in 0..100 {
            logs_a.append_log(entry(worker_a_id, n, "a")).await.unwrap();
        }
    });
    let task_b = tokio::spawn(async move {
        for n in 0..100 {
            logs_b.append_log(entry(worker_b_id, n, "b")).await.unwrap();
        }
    });
    task_a.await.unwrap();
    task_b.await.unwrap();

    let service = LogService::new(jobs, logs);
    let response = service.get_aggregated_logs(root_id, true, None, 500, None, LogOrder::Asc).await.unwrap();

    assert_eq!(response.logs.len(), 200);
    assert!(response.next_cursor.is_none());

    let mut last_seen: HashMap<JobId, u32> = HashMap::new();
    for e in &response.logs {
        let n: u32 = e.message.rsplit('-').next().unwrap().parse().unwrap();
        if let Some(&prev) = last_seen.get(&e.job_id) {
            assert!(n > prev, "job {} saw entry {n} after {prev}: merge reordered a single worker's own writes", e.job_id);
        }
        last_seen.insert(e.job_id, n);
    }
    assert_eq!(last_seen.len(), 2);
}
