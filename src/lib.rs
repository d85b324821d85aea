//! tw - a todo list kept by a background persistence worker
//!
//! The UI side never touches the store. It sends typed requests over a
//! channel to a worker thread that owns the `SQLite` connection, applies
//! each request in its own transaction and answers with the full list.
//!
//! # Architecture
//!
//! - [`model`] - Data types (Todo, `NewTodo`)
//! - [`protocol`] - Request/reply messages exchanged with the worker
//! - [`worker`] - Persistence worker thread
//! - [`client`] - Correlating client for the worker channel
//! - [`ui`] - Controller, rendering and the interactive shell
//! - [`storage`] - `SQLite` database layer
//! - [`config`] - Configuration management
//! - [`cli`] - Command-line interface using clap
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod storage;
pub mod ui;
pub mod worker;

pub use error::{Error, Result};

/// Global quiet flag for `--quiet`.
///
/// When set, commands skip their human-readable output. JSON output and
/// errors are still printed.
pub static QUIET: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if quiet mode is active.
#[inline]
#[must_use]
pub fn is_quiet() -> bool {
    QUIET.load(std::sync::atomic::Ordering::Relaxed)
}
