// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! The log storage contract (§6.1). All `Get…` methods return entries
//! newest-first; callers that need chronological order (the Log Service's
//! ascending aggregation, §4.3.4) reverse each page themselves.

use crate::error::StorageError;
use async_trait::async_trait;
use joborc_core::{JobId, LogEntry, LogLevel};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait LogStorage: Send + Sync {
    async fn append_log(&self, entry: LogEntry) -> Result<(), StorageError>;
    async fn append_logs(&self, entries: Vec<LogEntry>) -> Result<(), StorageError>;

    async fn get_logs(&self, job_id: JobId, limit: usize) -> Result<Vec<LogEntry>, StorageError>;
    async fn get_logs_by_level(
        &self,
        job_id: JobId,
        level: LogLevel,
        limit: usize,
    ) -> Result<Vec<LogEntry>, StorageError>;
    async fn get_logs_with_offset(
        &self,
        job_id: JobId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>, StorageError>;
    async fn get_logs_by_level_with_offset(
        &self,
        job_id: JobId,
        level: LogLevel,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>, StorageError>;

    async fn count_logs(&self, job_id: JobId) -> Result<usize, StorageError>;
    async fn count_logs_by_level(&self, job_id: JobId, level: LogLevel) -> Result<usize, StorageError>;

    async fn delete_logs(&self, job_id: JobId) -> Result<usize, StorageError>;
}

/// Reference in-memory implementation, append-only per job id, kept sorted
/// by [`joborc_core::Sequence`] on write so every `Get…` can simply reverse
/// a slice rather than re-sort on each read.
#[derive(Clone, Default)]
pub struct InMemoryLogStorage {
    by_job: Arc<Mutex<HashMap<JobId, Vec<LogEntry>>>>,
}

impl InMemoryLogStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_sorted(entries: &mut Vec<LogEntry>, entry: LogEntry) {
        let pos = entries.partition_point(|e| e.sort_key() <= entry.sort_key());
        entries.insert(pos, entry);
    }
}

#[async_trait]
impl LogStorage for InMemoryLogStorage {
    async fn append_log(&self, entry: LogEntry) -> Result<(), StorageError> {
        let mut by_job = self.by_job.lock();
        let entries = by_job.entry(entry.associated_job_id).or_default();
        Self::insert_sorted(entries, entry);
        Ok(())
    }

    async fn append_logs(&self, entries: Vec<LogEntry>) -> Result<(), StorageError> {
        let mut by_job = self.by_job.lock();
        for entry in entries {
            let bucket = by_job.entry(entry.associated_job_id).or_default();
            Self::insert_sorted(bucket, entry);
        }
        Ok(())
    }

    async fn get_logs(&self, job_id: JobId, limit: usize) -> Result<Vec<LogEntry>, StorageError> {
        self.get_logs_with_offset(job_id, limit, 0).await
    }

    async fn get_logs_by_level(
        &self,
        job_id: JobId,
        level: LogLevel,
        limit: usize,
    ) -> Result<Vec<LogEntry>, StorageError> {
        self.get_logs_by_level_with_offset(job_id, level, limit, 0).await
    }

    async fn get_logs_with_offset(
        &self,
        job_id: JobId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>, StorageError> {
        let by_job = self.by_job.lock();
        let entries = by_job.get(&job_id).cloned().unwrap_or_default();
        Ok(newest_first_page(entries, limit, offset))
    }

    async fn get_logs_by_level_with_offset(
        &self,
        job_id: JobId,
        level: LogLevel,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LogEntry>, StorageError> {
        let by_job = self.by_job.lock();
        let entries: Vec<LogEntry> = by_job
            .get(&job_id)
            .map(|v| v.iter().filter(|e| e.level >= level).cloned().collect())
            .unwrap_or_default();
        Ok(newest_first_page(entries, limit, offset))
    }

    async fn count_logs(&self, job_id: JobId) -> Result<usize, StorageError> {
        Ok(self.by_job.lock().get(&job_id).map(Vec::len).unwrap_or(0))
    }

    async fn count_logs_by_level(&self, job_id: JobId, level: LogLevel) -> Result<usize, StorageError> {
        Ok(self
            .by_job
            .lock()
            .get(&job_id)
            .map(|v| v.iter().filter(|e| e.level >= level).count())
            .unwrap_or(0))
    }

    async fn delete_logs(&self, job_id: JobId) -> Result<usize, StorageError> {
        Ok(self.by_job.lock().remove(&job_id).map(|v| v.len()).unwrap_or(0))
    }
}

/// Takes `entries` (stored oldest-first), reverses to newest-first, and
/// applies `offset`/`limit` — matching §6.1: "All `Get…` return entries
/// newest-first."
fn newest_first_page(mut entries: Vec<LogEntry>, limit: usize, offset: usize) -> Vec<LogEntry> {
    entries.reverse();
    entries.into_iter().skip(offset).take(limit).collect()
}

#[cfg(test)]
#[path = "log_storage_tests.rs"]
mod tests;
