// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Log Service (§4.3): the read path over persisted logs. Aggregates a job
//! and (optionally) its descendants into one chronological stream via a
//! k-way merge over per-job lazy iterators, with cursor-based pagination.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};
use std::sync::Arc;

use joborc_core::{JobId, LogEntry, LogLevel};
use joborc_storage::{JobFilter, LogStorage, QueueStorage};
use joborc_wire::{Cursor, JobLogMetadata, LogEntryDto, LogOrder, LogsResponse, ReadApiError};

/// Breadth-first descendant enumeration stops here (§8 boundary behavior;
/// §9 "a defense against accidental misuse").
const MAX_DESCENDANTS: usize = 1000;

/// Minimum per-job fetch batch (§4.3 step 3).
const MIN_BATCH_SIZE: usize = 10;

pub struct LogService {
    jobs: Arc<dyn QueueStorage>,
    logs: Arc<dyn LogStorage>,
}

impl LogService {
    pub fn new(jobs: Arc<dyn QueueStorage>, logs: Arc<dyn LogStorage>) -> Self {
        Self { jobs, logs }
    }

    pub async fn get_aggregated_logs(
        &self,
        parent_id: JobId,
        include_descendants: bool,
        level_filter: Option<LogLevel>,
        limit: usize,
        cursor: Option<String>,
        order: LogOrder,
    ) -> Result<LogsResponse, ReadApiError> {
        let parent = self.jobs.get_job(parent_id).await?.ok_or(ReadApiError::JobNotFound)?;

        let mut metadata = HashMap::new();
        metadata.insert(parent_id, JobLogMetadata::from(&parent));
        let mut job_ids = vec![parent_id];

        if include_descendants {
            let mut frontier = VecDeque::new();
            frontier.push_back(parent_id);
            'bfs: while let Some(current) = frontier.pop_front() {
                for child in self.jobs.get_child_jobs(current).await? {
                    if job_ids.len() >= MAX_DESCENDANTS + 1 {
                        break 'bfs;
                    }
                    metadata.insert(child.id, JobLogMetadata::from(&child));
                    job_ids.push(child.id);
                    frontier.push_back(child.id);
                }
            }
        }

        let decoded_cursor = cursor.as_deref().map(Cursor::decode).transpose()?;

        let batch_size = limit.div_ceil(job_ids.len().max(1)).max(MIN_BATCH_SIZE);
        let mut iterators: Vec<JobIterator> =
            job_ids.iter().map(|id| JobIterator::new(*id, level_filter, batch_size)).collect();

        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();
        for (index, iterator) in iterators.iter_mut().enumerate() {
            if let Some(entry) = iterator.peek(self.logs.as_ref(), order, decoded_cursor.as_ref()).await {
                heap.push(HeapEntry::new(entry, index, order));
            }
        }

        let mut results = Vec::with_capacity(limit);
        while results.len() < limit {
            let Some(top) = heap.pop() else { break };
            let index = top.job_index;
            let entry = iterators[index].pop().expect("heap entry must match the iterator's buffered head");
            results.push(entry);
            if let Some(next) = iterators[index].peek(self.logs.as_ref(), order, decoded_cursor.as_ref()).await {
                heap.push(HeapEntry::new(next, index, order));
            }
        }

        let next_cursor = if heap.is_empty() {
            None
        } else {
            results.last().map(|entry| {
                Cursor { full_timestamp: entry.full_timestamp.clone(), job_id: entry.associated_job_id, sequence: entry.sequence.0.clone() }
                    .encode()
            })
        };

        Ok(LogsResponse { logs: results.iter().map(LogEntryDto::from).collect(), metadata, next_cursor })
    }
}

/// Lazy, paged stream of one job's logs with cursor filtering applied to
/// its first fetched batch only (§4.3 step 5).
struct JobIterator {
    job_id: JobId,
    level_filter: Option<LogLevel>,
    offset: usize,
    batch_size: usize,
    buffer: VecDeque<LogEntry>,
    exhausted: bool,
    first_fill_done: bool,
}

impl JobIterator {
    fn new(job_id: JobId, level_filter: Option<LogLevel>, batch_size: usize) -> Self {
        Self { job_id, level_filter, offset: 0, batch_size, buffer: VecDeque::new(), exhausted: false, first_fill_done: false }
    }

    async fn ensure_buffered(&mut self, logs: &dyn LogStorage, order: LogOrder, cursor: Option<&Cursor>) {
        if !self.buffer.is_empty() || self.exhausted {
            return;
        }
        let fetched = match self.level_filter {
            Some(level) => logs.get_logs_by_level_with_offset(self.job_id, level, self.batch_size, self.offset).await,
            None => logs.get_logs_with_offset(self.job_id, self.batch_size, self.offset).await,
        };
        let mut batch = match fetched {
            Ok(batch) => batch,
            Err(err) => {
                tracing::error!(job_id = %self.job_id, %err, "log fetch failed; treating iterator as exhausted");
                self.exhausted = true;
                return;
            }
        };
        if batch.is_empty() {
            self.exhausted = true;
            return;
        }
        self.offset += batch.len();
        if order == LogOrder::Asc {
            batch.reverse();
        }
        if !self.first_fill_done {
            self.first_fill_done = true;
            if let Some(cursor) = cursor {
                let cursor_key = (cursor.sequence.as_str(), cursor.full_timestamp.as_str(), cursor.job_id.as_str());
                batch.retain(|entry| match order {
                    LogOrder::Asc => entry.sort_key() > cursor_key,
                    LogOrder::Desc => entry.sort_key() < cursor_key,
                });
            }
        }
        self.buffer.extend(batch);
    }

    async fn peek(&mut self, logs: &dyn LogStorage, order: LogOrder, cursor: Option<&Cursor>) -> Option<LogEntry> {
        self.ensure_buffered(logs, order, cursor).await;
        self.buffer.front().cloned()
    }

    fn pop(&mut self) -> Option<LogEntry> {
        self.buffer.pop_front()
    }
}

/// A buffered candidate entry plus which job iterator it came from. Ordered
/// so `BinaryHeap::pop` always yields the next entry in the requested
/// direction — ascending wants the min pulled first, descending the max.
struct HeapEntry {
    sort_key: (String, String, String),
    job_index: usize,
    order: LogOrder,
}

impl HeapEntry {
    fn new(entry: LogEntry, job_index: usize, order: LogOrder) -> Self {
        let (sequence, full_timestamp, job_id) = entry.sort_key();
        Self { sort_key: (sequence.to_string(), full_timestamp.to_string(), job_id.to_string()), job_index, order }
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key == other.sort_key
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        let natural = self.sort_key.cmp(&other.sort_key);
        match self.order {
            LogOrder::Asc => natural.reverse(),
            LogOrder::Desc => natural,
        }
    }
}

#[cfg(test)]
#[path = "log_service_tests.rs"]
mod tests;
