// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! Job orchestration daemon: wires storage, the orchestration engine, and
//! the read API together, and owns the process's logging and configuration
//! setup.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod control;
pub mod env;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod logging;

pub use config::Config;
pub use error::DaemonError;
pub use lifecycle::{Daemon, JoborcDaemon};
