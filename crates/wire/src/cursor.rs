// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Opaque pagination cursor for the log read API (§6.3, §8 round-trip law).
//!
//! A cursor encodes the sort position of the last entry seen: the
//! full-precision timestamp, the job it belongs to (disambiguates ties
//! across jobs in a k-way merge), and its [`joborc_core::Sequence`]. It is
//! base64-encoded so it's safe to pass as a single query-string value, and
//! is otherwise meaningless to the client — `GetLogs` never round-trips one
//! back to the caller except as `next_cursor`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use joborc_core::JobId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub full_timestamp: String,
    pub job_id: JobId,
    pub sequence: String,
}

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("malformed cursor")]
    Malformed,
}

impl Cursor {
    pub fn encode(&self) -> String {
        let raw = format!("{}|{}|{}", self.full_timestamp, self.job_id, self.sequence);
        URL_SAFE_NO_PAD.encode(raw)
    }

    pub fn decode(opaque: &str) -> Result<Self, CursorError> {
        let raw = URL_SAFE_NO_PAD.decode(opaque).map_err(|_| CursorError::Malformed)?;
        let raw = String::from_utf8(raw).map_err(|_| CursorError::Malformed)?;
        let mut parts = raw.splitn(3, '|');
        let full_timestamp = parts.next().ok_or(CursorError::Malformed)?.to_string();
        let job_id_str = parts.next().ok_or(CursorError::Malformed)?;
        let sequence = parts.next().ok_or(CursorError::Malformed)?.to_string();
        if full_timestamp.is_empty() || sequence.is_empty() {
            return Err(CursorError::Malformed);
        }
        if job_id_str.is_empty() {
            return Err(CursorError::Malformed);
        }
        let job_id = JobId::from_string(job_id_str);
        Ok(Cursor { full_timestamp, job_id, sequence })
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
