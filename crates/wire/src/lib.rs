// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! joborc-wire: wire types for the Job Orchestration Core's Read API
//! (§6.3) and the daemon's local control socket framing.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod control;
mod cursor;
mod dto;
mod error;
mod framing;

pub use control::{ControlRequest, ControlResponse};
pub use cursor::{Cursor, CursorError};
pub use dto::{
    JobListQuery, JobLogMetadata, JobStatusResponse, JobSummary, LogEntryDto, LogOrder, LogsQuery,
    LogsResponse,
};
pub use error::{ProtocolError, ReadApiError};
pub use framing::{decode, encode, read_message, write_message, MAX_FRAME_BYTES};
