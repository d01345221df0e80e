// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Timestamp formatting helpers for [`crate::LogEntry`] (§3.3).

use chrono::{DateTime, Utc};

/// RFC3339 with nanosecond precision — the `full_timestamp` field and the
/// timestamp component of [`crate::Sequence`].
pub fn format_full_timestamp(epoch_ms: u64) -> String {
    let dt = epoch_ms_to_datetime(epoch_ms);
    dt.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// Display-formatted `HH:MM:SS.mmm` — the `timestamp` field.
pub fn format_display_timestamp(epoch_ms: u64) -> String {
    let dt = epoch_ms_to_datetime(epoch_ms);
    dt.format("%H:%M:%S%.3f").to_string()
}

/// Format seconds as a short human-readable duration: `"5s"`, `"2m"`,
/// `"1h30m"`, `"3d"`. Minutes are included in the hours range only when
/// non-zero (`"1h"` vs `"1h5m"`).
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{h}h{m}m")
        } else {
            format!("{h}h")
        }
    } else {
        format!("{}d", secs / 86400)
    }
}

fn epoch_ms_to_datetime(epoch_ms: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(
        (epoch_ms / 1000) as i64,
        ((epoch_ms % 1000) * 1_000_000) as u32,
    )
    .unwrap_or_else(|| DateTime::<Utc>::from_timestamp(0, 0).expect("epoch is valid"))
}
