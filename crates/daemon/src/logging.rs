// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Logging wiring (ambient stack "Logging"): a `tracing-subscriber` `fmt`
//! layer with an `EnvFilter` (default `info`) plus a rolling file
//! appender under the state directory, exactly as the teacher's lifecycle
//! module wires logging before accepting connections. A second layer,
//! [`JobLogLayer`], captures any event carrying a `job_id` field and
//! forwards it as a [`RawLogEvent`] batch to the Log Consumer (§4.2) —
//! application logs and job-correlated logs are two views over the same
//! `tracing` events.

use std::collections::HashMap;
use std::time::Duration;

use joborc_core::log_entry::tracing_level_compat;
use joborc_core::{Clock, JobId, LogLevel, SystemClock};
use joborc_engine::{LogBatch, RawLogEvent};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Registry};

const BATCH_INTERVAL: Duration = Duration::from_millis(100);
const LOG_BATCH_CHANNEL_CAPACITY: usize = 64;

#[derive(Default)]
struct FieldCollector {
    job_id: Option<String>,
    message: String,
    fields: HashMap<String, String>,
}

impl FieldCollector {
    fn record(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "job_id" => self.job_id = Some(value),
            _ => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record(field.name(), format!("{value:?}").trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field.name(), value.to_string());
    }
}

/// The job-log bridging layer. Holds only a sender, so it's cheap to
/// install alongside the process-log `fmt` layer.
struct JobLogLayer {
    tx: mpsc::UnboundedSender<RawLogEvent>,
}

impl<S> Layer<S> for JobLogLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut collector = FieldCollector::default();
        event.record(&mut collector);
        let Some(job_id) = collector.job_id else { return };

        let level = match *event.metadata().level() {
            tracing::Level::TRACE => tracing_level_compat::Level::Trace,
            tracing::Level::DEBUG => tracing_level_compat::Level::Debug,
            tracing::Level::INFO => tracing_level_compat::Level::Info,
            tracing::Level::WARN => tracing_level_compat::Level::Warn,
            tracing::Level::ERROR => tracing_level_compat::Level::Error,
        };

        let _ = self.tx.send(RawLogEvent {
            correlation_id: Some(JobId::from_string(job_id)),
            level: LogLevel::from_tracing_level(level),
            message: collector.message,
            epoch_ms: SystemClock.epoch_ms(),
            fields: collector.fields,
        });
    }
}

/// Installs the global `tracing` subscriber and returns the receiving end
/// of the job-log batch channel for the Log Consumer to drain.
///
/// `log_path`'s parent directory must already exist; the daemon creates
/// it as part of resolving the state directory before calling this.
pub fn init(log_path: &std::path::Path) -> mpsc::Receiver<LogBatch> {
    let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<RawLogEvent>();
    let (batch_tx, batch_rx) = mpsc::channel::<LogBatch>(LOG_BATCH_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut pending = Vec::new();
        let mut interval = tokio::time::interval(BATCH_INTERVAL);
        loop {
            tokio::select! {
                raw = raw_rx.recv() => {
                    match raw {
                        Some(event) => pending.push(event),
                        None => break,
                    }
                }
                _ = interval.tick() => {
                    if !pending.is_empty() {
                        let batch = std::mem::take(&mut pending);
                        if batch_tx.send(LogBatch(batch)).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
        if !pending.is_empty() {
            let _ = batch_tx.send(LogBatch(pending)).await;
        }
    });

    let dir = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("daemon.log"));
    let file_appender = tracing_appender::rolling::daily(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // Leaked deliberately: the guard must outlive the process for the
    // non-blocking writer to flush on every log call.
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false);

    let subscriber = Registry::default().with(filter).with(fmt_layer).with(JobLogLayer { tx: raw_tx });
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("global tracing subscriber already set");
    }

    batch_rx
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
