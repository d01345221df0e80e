// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

use thiserror::Error;

use crate::cursor::CursorError;

/// Errors the Read API surfaces as HTTP status codes (§6.3, §7).
#[derive(Debug, Error)]
pub enum ReadApiError {
    #[error("unknown job")]
    JobNotFound,

    #[error("malformed cursor")]
    MalformedCursor,

    #[error("unrecognized log level")]
    UnknownLevel,

    #[error(transparent)]
    Storage(#[from] joborc_storage::StorageError),
}

impl From<CursorError> for ReadApiError {
    fn from(_: CursorError) -> Self {
        ReadApiError::MalformedCursor
    }
}

/// Errors from the length-prefixed wire framing (local control socket).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("message exceeds maximum frame size: {0} bytes")]
    FrameTooLarge(u32),
}
