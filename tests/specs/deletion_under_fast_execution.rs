// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! §8 scenario 5: a step that completes well inside its visibility window
//! is deleted from the queue exactly once — the delete uses a fresh
//! context, not a stale deadline inherited from `receive`, so it succeeds
//! even after the processing delay, and the message never reappears or
//! gets dead-lettered.

use std::sync::Arc;
use std::time::Duration;

use joborc_core::{JobId, QueueConfig, QueueMessage};
use joborc_engine::QueueManager;
use joborc_storage::InMemoryMessageQueue;

#[tokio::test]
async fn a_fast_completing_message_is_deleted_once_and_never_redelivered() {
    let queue = QueueManager::new(Arc::new(InMemoryMessageQueue::new()), &QueueConfig::default());
    queue.enqueue(QueueMessage::new(JobId::new(), "noop", 0)).await.unwrap();

    let (message, handle) = queue.receive(Duration::from_millis(50)).await.unwrap().expect("message should be visible");
    assert_eq!(message.receive_count, 0);

    // Simulate a step that finishes in ~50ms, well under the configured
    // visibility timeout.
    tokio::time::sleep(Duration::from_millis(50)).await;
    queue.delete(handle).await.unwrap();

    let redelivered = queue.receive(Duration::from_millis(50)).await.unwrap();
    assert!(redelivered.is_none(), "a deleted message must not be redelivered");
    assert!(queue.dead_letters().await.unwrap().is_empty());
}
