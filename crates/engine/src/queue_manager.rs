// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Queue Manager (§4.4): thin wrapper over [`MessageQueue`] that fixes the
//! visibility/delete timeouts from configuration and enforces the
//! "fresh context" requirement at the call site — `delete` always builds
//! its own [`tokio::time::timeout`] from `self.delete_timeout`, never one
//! threaded through from `receive`.

use crate::error::EngineError;
use joborc_core::QueueConfig;
use joborc_storage::{DeleteHandle, MessageQueue, StorageError};
use std::sync::Arc;
use std::time::Duration;

pub struct QueueManager {
    queue: Arc<dyn MessageQueue>,
    visibility_timeout: Duration,
    delete_timeout: Duration,
    max_receive_count: u32,
}

impl QueueManager {
    pub fn new(queue: Arc<dyn MessageQueue>, config: &QueueConfig) -> Self {
        Self {
            queue,
            visibility_timeout: config.visibility_timeout,
            delete_timeout: config.delete_timeout,
            max_receive_count: config.max_receive_count,
        }
    }

    pub async fn enqueue(&self, message: joborc_core::QueueMessage) -> Result<(), StorageError> {
        self.queue.enqueue(message).await
    }

    /// Blocks up to `wait_timeout` for a message; the received message is
    /// invisible for `self.visibility_timeout` (from configuration). Leases
    /// that expired since the last call are reaped against
    /// `self.max_receive_count` before anything else is returned.
    pub async fn receive(
        &self,
        wait_timeout: Duration,
    ) -> Result<Option<(joborc_core::QueueMessage, DeleteHandle)>, StorageError> {
        self.queue.receive(wait_timeout, self.visibility_timeout, self.max_receive_count).await
    }

    /// Acknowledges `handle` under a fresh timeout built at this call, per
    /// §4.4's "attested bug class" — never the deadline `receive` completed
    /// with.
    pub async fn delete(&self, handle: DeleteHandle) -> Result<(), EngineError> {
        match tokio::time::timeout(self.delete_timeout, self.queue.delete(handle)).await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => {
                tracing::error!(timeout_ms = %self.delete_timeout.as_millis(), "queue delete timed out");
                Err(EngineError::Other(format!("queue delete timed out after {:?}", self.delete_timeout)))
            }
        }
    }

    pub async fn requeue(&self, handle: DeleteHandle) -> Result<(), StorageError> {
        self.queue.requeue(handle, self.max_receive_count).await
    }

    pub async fn dead_letters(&self) -> Result<Vec<joborc_core::QueueMessage>, StorageError> {
        self.queue.dead_letters().await
    }
}

#[cfg(test)]
#[path = "queue_manager_tests.rs"]
mod tests;
