// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context, Result};
use joborc_core::JobStatus;
use joborc_wire::JobListQuery;

use crate::client::ApiClient;
use crate::output::{handle_list, OutputFormat};
use crate::table::{Column, Table};

fn parse_status(raw: &str) -> Result<JobStatus> {
    match raw.to_ascii_lowercase().as_str() {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        "cancelled" => Ok(JobStatus::Cancelled),
        other => anyhow::bail!("unrecognized status '{other}' (expected pending, running, completed, failed, cancelled)"),
    }
}

pub async fn handle(http_addr: &str, status: Option<String>, format: OutputFormat) -> Result<()> {
    let status = status.map(|s| parse_status(&s)).transpose().context("parsing --status")?;
    let client = ApiClient::new(format!("http://{http_addr}"));
    let query = JobListQuery { status, job_type: None };
    let jobs = client.jobs(&query).await?;

    handle_list(format, &jobs, "No jobs found", |jobs, out| {
        let mut table = Table::new(vec![Column::left("ID"), Column::left("TYPE"), Column::left("NAME"), Column::status("STATUS"), Column::left("CREATED")]);
        for job in jobs {
            let created = joborc_core::time_fmt::format_elapsed((now_ms().saturating_sub(job.created_at_epoch_ms)) / 1000);
            table.row(vec![job.id.to_string(), format!("{:?}", job.job_type).to_lowercase(), job.name.clone(), format!("{:?}", job.status).to_lowercase(), format!("{created} ago")]);
        }
        table.render(out);
    })
}

fn now_ms() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64
}
