// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;

use crate::client::ApiClient;
use crate::output::{format_or_json, OutputFormat};

pub async fn handle(http_addr: &str, id: &str, format: OutputFormat) -> Result<()> {
    let client = ApiClient::new(format!("http://{http_addr}"));
    let status = client.status(id).await?;

    format_or_json(format, &status, || {
        println!("{}  {}", crate::color::header(&status.id.to_string()), crate::color::status(&format!("{:?}", status.status).to_lowercase()));
        println!("name:       {}", status.name);
        println!("type:       {:?}", status.job_type);
        if let Some(parent) = &status.parent_id {
            println!("parent:     {parent}");
        }
        println!("progress:   {}/{}", status.progress.current, status.progress.total);
        println!(
            "children:   {} total, {} completed, {} failed, {} cancelled, {} pending, {} running",
            status.counters.total_children,
            status.counters.completed_children,
            status.counters.failed_children,
            status.counters.cancelled_children,
            status.counters.pending_children,
            status.counters.running_children,
        );
        if let Some(error) = &status.error_message {
            println!("error:      {}", crate::color::muted(error));
        }
    })
}
