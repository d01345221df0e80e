// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Correlated log pipeline (§4.2): one consumer drains batches emitted by
//! the process's own `tracing` instrumentation, writes them to
//! [`LogStorage`] grouped by correlation id, and republishes a filtered
//! subset as `log_event` on the [`EventBus`].
//!
//! "Services only log; events derive from logs" (§9): Step Managers and
//! the Job Manager never publish `log_event` themselves — they log through
//! `tracing`, and this is the only place a `log_event` gets minted.

use crate::event_bus::EventBus;
use joborc_core::{Event, JobId, LogEntry, LogLevel, Sequence};
use joborc_storage::LogStorage;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Known structured fields extracted into [`LogEntry::context`] (§3.3).
/// Anything else gets appended to the message as trailing `key=value` pairs.
const KNOWN_CONTEXT_KEYS: &[&str] =
    &["phase", "originator", "step_name", "source_type", "manager_id", "step_id", "parent_id"];

/// Canonical messages that must never reach the job-log store or the bus,
/// to break the refresh -> query -> log -> refresh cycle described in §4.2
/// step 1 and §9 "Recursion safety of the event bus".
const INFRA_EXACT_MESSAGES: &[&str] = &["http request completed", "http request failed"];
const INFRA_SUBSTRINGS: &[&str] =
    &["websocket client connected", "websocket client disconnected", "websocket client error"];

fn is_infrastructure_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    INFRA_EXACT_MESSAGES.iter().any(|m| lower == *m)
        || INFRA_SUBSTRINGS.iter().any(|s| lower.contains(s))
}

/// One `tracing`-emitted record, pre-transform. `correlation_id` is `None`
/// when the emitting code had no job in scope (a process-startup log, for
/// instance); such entries never reach the job-log store (§7).
#[derive(Debug, Clone)]
pub struct RawLogEvent {
    pub correlation_id: Option<JobId>,
    pub level: LogLevel,
    pub message: String,
    pub epoch_ms: u64,
    pub fields: HashMap<String, String>,
}

/// A batch as delivered by the logger's channel (§4.2, §5: "bounded,
/// single consumer, multiple producers").
#[derive(Debug, Clone, Default)]
pub struct LogBatch(pub Vec<RawLogEvent>);

fn transform(raw: RawLogEvent, correlation_id: JobId) -> LogEntry {
    let full_timestamp = joborc_core::time_fmt::format_full_timestamp(raw.epoch_ms);
    let timestamp = joborc_core::time_fmt::format_display_timestamp(raw.epoch_ms);
    let sequence = Sequence::next(&full_timestamp);

    let mut context = HashMap::new();
    context.insert("job_id".to_string(), correlation_id.to_string());
    let mut message = raw.message;
    let mut leftover: Vec<(String, String)> = Vec::new();
    for (key, value) in raw.fields {
        if KNOWN_CONTEXT_KEYS.contains(&key.as_str()) {
            context.insert(key, value);
        } else {
            leftover.push((key, value));
        }
    }
    if !leftover.is_empty() {
        leftover.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in leftover {
            message.push_str(&format!(" {key}={value}"));
        }
    }

    LogEntry { associated_job_id: correlation_id, sequence, full_timestamp, timestamp, level: raw.level, message, context }
}

/// Drains log batches, persists them, and republishes a filtered subset.
/// One instance per process; §4.2 calls for a single dedicated consumer.
pub struct LogConsumer {
    storage: Arc<dyn LogStorage>,
    bus: EventBus,
    min_event_level: LogLevel,
    /// Recursion-safe publishing guard (§4.2 step 5, §8 property 5): keyed
    /// `"<correlation_id>:<message>"`, held only for the duration of one
    /// `bus.publish` call. Needed because a subscriber — or this consumer's
    /// own error logging, if the process's tracing layer loops back into
    /// it — could log, re-entering this path for the same entry.
    publishing: Mutex<HashSet<String>>,
}

impl LogConsumer {
    pub fn new(storage: Arc<dyn LogStorage>, bus: EventBus, min_event_level: LogLevel) -> Self {
        Self { storage, bus, min_event_level, publishing: Mutex::new(HashSet::new()) }
    }

    /// Runs until `batches` is closed (`Stop()`, §4.2: "the consumer exits
    /// after draining the current batch").
    pub async fn run(&self, mut batches: tokio::sync::mpsc::Receiver<LogBatch>) {
        while let Some(batch) = batches.recv().await {
            self.process_batch(batch).await;
        }
    }

    pub async fn process_batch(&self, batch: LogBatch) {
        let mut groups: HashMap<JobId, Vec<LogEntry>> = HashMap::new();
        let mut to_publish = Vec::new();

        for raw in batch.0 {
            if is_infrastructure_message(&raw.message) {
                continue;
            }
            let Some(correlation_id) = raw.correlation_id else {
                tracing::warn!(message = %raw.message, "log emitted with no correlation id; dropped");
                continue;
            };
            let entry = transform(raw, correlation_id);
            if entry.level >= self.min_event_level {
                to_publish.push(entry.clone());
            }
            groups.entry(correlation_id).or_default().push(entry);
        }

        let mut handles = Vec::with_capacity(groups.len());
        for (correlation_id, entries) in groups {
            let storage = Arc::clone(&self.storage);
            handles.push(tokio::spawn(async move {
                if let Err(err) = storage.append_logs(entries).await {
                    tracing::error!(job_id = %correlation_id, %err, "failed to persist log batch");
                }
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }

        for entry in to_publish {
            self.publish_log_event(entry);
        }
    }

    fn publish_log_event(&self, entry: LogEntry) {
        let key = format!("{}:{}", entry.associated_job_id, entry.message);
        {
            let mut publishing = self.publishing.lock();
            if !publishing.insert(key.clone()) {
                return;
            }
        }
        let _ = self.bus.publish(
            &CancellationToken::new(),
            Event::LogEvent { job_id: entry.associated_job_id, level: entry.level, message: entry.message, timestamp: entry.timestamp, context: entry.context },
        );
        self.publishing.lock().remove(&key);
    }
}

#[cfg(test)]
#[path = "log_consumer_tests.rs"]
mod tests;
