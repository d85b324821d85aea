//! Configuration management.
//!
//! This module resolves where the todo database lives and loads the
//! optional settings file.
//!
//! # Layout
//!
//! - **Database**: `~/.tw/data/todos.db`
//! - **Test database**: `~/.tw/test/todos.db` (when `TW_TEST_DB` is set)
//! - **Settings**: `~/.tw/config.json`

mod settings;

pub use settings::{load_settings, Settings};

use crate::error::{Error, Result};
use crate::worker::{StoreLocation, WorkerConfig, DEFAULT_QUEUE_CAPACITY};

use std::path::{Path, PathBuf};

/// Get the global tw directory location.
#[must_use]
pub fn global_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".tw"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `TW_TEST_DB=1` (or any non-empty value).
/// This redirects all database operations to an isolated test database.
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var("TW_TEST_DB").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path.
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_dir().map(|dir| dir.join("test").join("todos.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. If `explicit_path` is provided (`--db` / `TW_DB`), use it directly
/// 2. `TW_TEST_DB` environment variable → uses test database
/// 3. Global location: `~/.tw/data/todos.db`
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_dir().map(|dir| dir.join("data").join("todos.db"))
}

/// Build the worker configuration for a command.
///
/// Creates the database's parent directory if needed.
///
/// # Errors
///
/// Returns an error if no database location can be determined, the
/// directory cannot be created, or the settings file is invalid.
pub fn worker_config(explicit_db: Option<&Path>) -> Result<WorkerConfig> {
    let db_path = resolve_db_path(explicit_db)
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let settings = load_settings()?;
    Ok(WorkerConfig {
        location: StoreLocation::File(db_path),
        busy_timeout_ms: settings.busy_timeout_ms,
        queue_capacity: settings.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY),
    })
}
