// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use anyhow::{Context, Result};

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

pub async fn handle(socket_path: &Path, path: &Path, format: OutputFormat) -> Result<()> {
    let source = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    // Parse and validate locally first so a malformed definition fails fast
    // with the parser's own error, rather than round-tripping to the daemon.
    let definition = joborc_runbook::parse(&source).context("parsing job definition")?;
    joborc_runbook::validate(&definition).context("validating job definition")?;

    let client = DaemonClient::connect(socket_path)?;
    let root_id = client.submit(source).await?;

    format_or_json(format, &serde_json::json!({ "root_id": root_id }), || {
        println!("Submitted {} ({})", crate::color::header(&definition.name), crate::color::muted(&root_id));
    })
}
