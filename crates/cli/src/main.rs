// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! oj - Job Orchestration Core CLI

mod client;
mod color;
mod commands;
mod exit_error;
mod output;
mod table;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "oj", version, about = "Submit and inspect jobs on the Job Orchestration Core")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a Job Definition file
    Submit {
        /// Path to an HCL Job Definition
        path: PathBuf,
    },
    /// Show a job's status and counters
    Status {
        /// Job id
        id: String,
    },
    /// Show a job's aggregated logs
    Logs {
        /// Job id
        id: String,
        /// Include descendant jobs' log entries
        #[arg(long)]
        include_descendants: bool,
        /// Minimum level: ALL, TRC, DBG, INF, WAR, ERR
        #[arg(long)]
        level: Option<String>,
        /// Maximum entries to return
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Poll for new entries after the initial page
        #[arg(long, short)]
        follow: bool,
    },
    /// List jobs
    Jobs {
        /// Filter by status: pending, running, completed, failed, cancelled
        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {msg}");
        }
        std::process::exit(code);
    }
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, skip the
/// "Caused by" chain to avoid noisy duplicate output (common when thiserror
/// variants use `#[error("... {0}")]` with `#[from]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {i}: {cause}"));
    }
    buf
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.output;

    let state_dir = joborc_daemon::env::state_dir().ok_or_else(|| anyhow::anyhow!("could not determine state directory"))?;
    let http_addr = joborc_daemon::env::http_addr();
    let socket_path = joborc_daemon::env::socket_path(&state_dir);

    match cli.command {
        Commands::Submit { path } => commands::submit::handle(&socket_path, &path, format).await,
        Commands::Status { id } => commands::status::handle(&http_addr, &id, format).await,
        Commands::Logs { id, include_descendants, level, limit, follow } => {
            commands::logs::handle(&http_addr, &id, include_descendants, level, limit, follow, format).await
        }
        Commands::Jobs { status } => commands::jobs::handle(&http_addr, status, format).await,
    }
}
