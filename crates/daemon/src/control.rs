// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Local control socket (§3.5, §4.8, SUPPLEMENTED FEATURES): accepts one
//! framed [`ControlRequest`] per connection and replies with a
//! [`ControlResponse`], following the teacher's length-prefixed,
//! Unix-socket IPC shape but carrying a single request type — submitting a
//! Job Definition — rather than the teacher's full query/event protocol.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use joborc_core::Clock;
use joborc_engine::DefinitionOrchestrator;
use joborc_wire::{read_message, write_message, ControlRequest, ControlResponse};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;

/// Removes a stale socket file left behind by an unclean shutdown, then
/// binds fresh. Matches the teacher's own cleanup-before-bind convention.
pub fn bind(socket_path: &Path) -> std::io::Result<UnixListener> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    UnixListener::bind(socket_path)
}

/// Accepts connections until `shutdown_rx` fires, handling each serially —
/// this socket only ever sees one CLI invocation at a time in practice, so
/// there is no need for the Job Processor's concurrency.
pub async fn serve<C: Clock + 'static>(
    listener: UnixListener,
    socket_path: PathBuf,
    orchestrator: Arc<DefinitionOrchestrator<C>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _addr)) => {
                        let orchestrator = orchestrator.clone();
                        tokio::spawn(async move {
                            if let Err(error) = handle_connection(stream, &orchestrator).await {
                                tracing::warn!(%error, "control socket connection failed");
                            }
                        });
                    }
                    Err(error) => tracing::warn!(%error, "control socket accept failed"),
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
    let _ = std::fs::remove_file(&socket_path);
}

async fn handle_connection<C: Clock + 'static>(
    mut stream: UnixStream,
    orchestrator: &DefinitionOrchestrator<C>,
) -> Result<(), joborc_wire::ProtocolError> {
    let payload = read_message(&mut stream).await?;
    let request: ControlRequest = joborc_wire::decode(&payload)?;

    let response = match request {
        ControlRequest::Submit { source } => match joborc_runbook::parse(&source) {
            Ok(definition) => match orchestrator.launch(&definition).await {
                Ok(root_id) => ControlResponse::Submitted { root_id: root_id.as_str().to_string() },
                Err(error) => ControlResponse::Error { message: error.to_string() },
            },
            Err(error) => ControlResponse::Error { message: error.to_string() },
        },
    };

    let bytes = joborc_wire::encode(&response)?;
    write_message(&mut stream, &bytes).await
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
