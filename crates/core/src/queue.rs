// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Queue message types (§3.2).

use crate::job::JobId;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a queue message.
    pub struct MessageId("msg-");
}

/// One pending work unit (§3.2). `receive_count` increments each time the
/// message becomes visible again without being deleted — by lease expiry,
/// explicit requeue, or (per the supplemented dead-letter policy) exhausted
/// retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    pub message_id: MessageId,
    pub job_id: JobId,
    pub action: String,
    pub enqueued_at_epoch_ms: u64,
    pub visible_at_epoch_ms: u64,
    pub receive_count: u32,
}

impl QueueMessage {
    pub fn new(job_id: JobId, action: impl Into<String>, now_ms: u64) -> Self {
        Self {
            message_id: MessageId::new(),
            job_id,
            action: action.into(),
            enqueued_at_epoch_ms: now_ms,
            visible_at_epoch_ms: now_ms,
            receive_count: 0,
        }
    }

    pub fn is_visible_at(&self, now_ms: u64) -> bool {
        now_ms >= self.visible_at_epoch_ms
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
