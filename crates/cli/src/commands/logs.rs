// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use joborc_wire::{LogOrder, LogsQuery};

use crate::client::ApiClient;
use crate::output::{format_or_json, poll_log_follow, OutputFormat};

fn render_line(entry: &joborc_wire::LogEntryDto) -> String {
    format!("{} [{:?}] {}: {}", entry.timestamp, entry.level, entry.job_id, entry.message)
}

pub async fn handle(http_addr: &str, id: &str, include_descendants: bool, level: Option<String>, limit: Option<usize>, follow: bool, format: OutputFormat) -> Result<()> {
    let client = ApiClient::new(format!("http://{http_addr}"));
    let id = id.to_string();

    let query = LogsQuery { include_descendants, level: level.clone(), limit, cursor: None, order: LogOrder::Asc };
    let response = client.logs(&id, &query).await?;

    format_or_json(format, &response, || {
        if response.logs.is_empty() {
            eprintln!("No log entries found for job {id}");
        }
        for entry in &response.logs {
            println!("{}", render_line(entry));
        }
    })?;

    if follow {
        if matches!(format, OutputFormat::Json) {
            eprintln!("warning: --follow is not supported with --output json");
            return Ok(());
        }
        let cursor = response.next_cursor;
        poll_log_follow(cursor, |cursor| {
            let client = ApiClient::new(format!("http://{http_addr}"));
            let id = id.clone();
            let level = level.clone();
            async move {
                let query = LogsQuery { include_descendants, level, limit: None, cursor, order: LogOrder::Asc };
                let page = client.logs(&id, &query).await.map_err(|e| anyhow::anyhow!(e))?;
                let mut content = String::new();
                for entry in &page.logs {
                    content.push_str(&render_line(entry));
                    content.push('\n');
                }
                Ok((content, page.next_cursor))
            }
        })
        .await?;
    }
    Ok(())
}
