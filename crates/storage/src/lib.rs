// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! joborc-storage: storage contracts for the Job Orchestration Core (§6.1)
//! and in-memory reference implementations of each.

mod error;
mod job_storage;
mod log_storage;
mod message_queue;

pub use error::StorageError;
pub use job_storage::{InMemoryJobStorage, JobFilter, QueueStorage, StepStats};
pub use log_storage::{InMemoryLogStorage, LogStorage};
pub use message_queue::{DeleteHandle, InMemoryMessageQueue, MessageQueue};
