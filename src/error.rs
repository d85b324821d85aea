//! Error types for the todo worker.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=worker, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for todo worker operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    StorageOpenFailed,
    DatabaseError,

    // Worker (exit 3)
    WorkerNotReady,
    WorkerError,

    // Validation (exit 4)
    InvalidRequest,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable `SCREAMING_SNAKE` code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::StorageOpenFailed => "STORAGE_OPEN_FAILED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::WorkerNotReady => "WORKER_NOT_READY",
            Self::WorkerError => "WORKER_ERROR",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::StorageOpenFailed | Self::DatabaseError => 2,
            Self::WorkerNotReady | Self::WorkerError => 3,
            Self::InvalidRequest => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }
}

// ── Error ─────────────────────────────────────────────────────

/// All errors surfaced by the library and the `tw` binary.
#[derive(Error, Debug)]
pub enum Error {
    /// The persistence worker is gone or never started.
    #[error("Worker not initialized")]
    WorkerNotReady,

    /// The worker answered a request with an error reply.
    #[error("Worker error: {0}")]
    Worker(String),

    /// A request payload had the wrong type or shape.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to open database at {path}: {source}")]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::WorkerNotReady => ErrorCode::WorkerNotReady,
            Self::Worker(_) => ErrorCode::WorkerError,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::StorageOpen { .. } => ErrorCode::StorageOpenFailed,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::WorkerNotReady => {
                Some("The persistence worker has stopped. Check the log output with -vv.".to_string())
            }
            Self::StorageOpen { path, .. } => Some(format!(
                "Check that {} is writable, or pass --db <path> / set TW_DB.",
                path.display()
            )),
            Self::Worker(msg) if msg == "Database initialization failed" => Some(
                "The worker could not open its database. Pass --db <path> or set TW_DB."
                    .to_string(),
            ),
            Self::InvalidRequest(msg) if msg.starts_with("unknown request type") => Some(
                "Known types: loadTodos, addTodo, toggleTodo, deleteTodo.".to_string(),
            ),
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
