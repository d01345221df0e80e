// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Recognized configuration sections (§6.4). These are pure data — loading
//! them from disk and resolving ambient paths is `joborc-daemon`'s job
//! (`joborc_daemon::config::Config::load`).

use crate::log_entry::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `logging` section: controls the Log Consumer's publication threshold (§4.2.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinEventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for MinEventLevel {
    fn default() -> Self {
        MinEventLevel::Info
    }
}

impl MinEventLevel {
    pub fn as_log_level(self) -> LogLevel {
        match self {
            MinEventLevel::Debug => LogLevel::Dbg,
            MinEventLevel::Info => LogLevel::Inf,
            MinEventLevel::Warn => LogLevel::War,
            MinEventLevel::Error => LogLevel::Err,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub min_event_level: MinEventLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { min_event_level: MinEventLevel::Info }
    }
}

/// `queue` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    #[serde(with = "humantime_ms")]
    pub visibility_timeout: Duration,
    #[serde(with = "humantime_ms")]
    pub delete_timeout: Duration,
    pub worker_pool_size: usize,
    /// Supplemented (§9 Open Question resolution, see DESIGN.md): messages
    /// are dead-lettered after this many receives without a successful ack.
    pub max_receive_count: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout: Duration::from_secs(60),
            delete_timeout: Duration::from_secs(5),
            worker_pool_size: 4,
            max_receive_count: 5,
        }
    }
}

/// `jobs` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    #[serde(with = "humantime_ms")]
    pub heartbeat_interval: Duration,
    pub stale_threshold_minutes: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            stale_threshold_minutes: 10,
        }
    }
}

/// Millisecond-integer (de)serialization for `Duration` fields in TOML,
/// which has no native duration type.
mod humantime_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}
