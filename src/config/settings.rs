//! Settings file (`~/.tw/config.json`).
//!
//! Every field is optional; a missing file means defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables read from the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite busy timeout for the worker's connection.
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,

    /// Depth of the worker's job queue.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

fn settings_path() -> Option<PathBuf> {
    super::global_dir().map(|dir| dir.join("config.json"))
}

/// Load settings from the default location.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings() -> Result<Settings> {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => Ok(Settings::default()),
    }
}

/// Load settings from a specific file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}
