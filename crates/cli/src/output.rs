// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Info about items that were truncated by [`apply_limit`].
pub struct Truncation {
    pub remaining: usize,
}

/// Apply a limit to a vec, returning truncation info if items were removed.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize) -> Option<Truncation> {
    let total = items.len();
    if total > limit {
        items.truncate(limit);
        Some(Truncation { remaining: total - limit })
    } else {
        None
    }
}

/// Render a list as text table or JSON. Handles empty check + format branch.
pub fn handle_list<T: Serialize>(format: OutputFormat, items: &[T], empty_msg: &str, render_text: impl FnOnce(&[T], &mut dyn Write)) -> anyhow::Result<()> {
    handle_list_with_limit(format, items, empty_msg, None, render_text)
}

/// Like [`handle_list`] but prints a truncation message when items were limited.
pub fn handle_list_with_limit<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    truncation: Option<Truncation>,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{empty_msg}");
            } else {
                render_text(items, &mut std::io::stdout());
            }
            if let Some(trunc) = truncation {
                if trunc.remaining > 0 {
                    println!("\n... {} more not shown. Use -n to see more.", trunc.remaining);
                }
            }
        }
    }
    Ok(())
}

/// Format-branch helper for non-list commands (status, etc.).
///
/// Renders as JSON when `format` is `Json`, otherwise calls `text_fn`.
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => {
            text_fn();
        }
    }
    Ok(())
}

/// Poll the Read API for log updates in a loop until Ctrl-C.
///
/// `poll_fn` takes the cursor returned by the previous page and returns the
/// new content printed plus the next cursor to poll from.
pub async fn poll_log_follow<F, Fut>(mut cursor: Option<String>, poll_fn: F) -> anyhow::Result<()>
where
    F: Fn(Option<String>) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<(String, Option<String>)>>,
{
    let poll_ms: u64 = std::env::var("OJ_LOG_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(1000);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_millis(poll_ms)) => {
                match poll_fn(cursor.clone()).await {
                    Ok((content, next_cursor)) => {
                        if !content.is_empty() {
                            print!("{content}");
                            let _ = std::io::stdout().flush();
                        }
                        if next_cursor.is_some() {
                            cursor = next_cursor;
                        }
                    }
                    Err(_) => {
                        // Connection lost — retry on next poll
                    }
                }
            }
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
