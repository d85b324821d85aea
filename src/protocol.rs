//! Message types exchanged between the UI controller and the worker.
//!
//! Wire shape (one JSON object per message):
//!
//! ```text
//! UI -> worker   { "id": 7, "type": "toggleTodo", "data": 1 }
//! worker -> UI   { "id": 7, "type": "todosLoaded", "data": [ ... ] }
//!                { "id": 7, "type": "error", "error": "invalid todo ID" }
//! ```
//!
//! The `id` is a correlation id chosen by the sender; the worker echoes it
//! unchanged. Id `0` is used for replies to messages that could not be
//! attributed to a request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{NewTodo, Todo};

pub const INVALID_TODO_DATA: &str = "invalid todo data";
pub const INVALID_TODO_ID: &str = "invalid todo ID";
pub const DB_INIT_FAILED: &str = "Database initialization failed";

/// A typed request to the persistence worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Request {
    LoadTodos,
    AddTodo(NewTodo),
    ToggleTodo(i64),
    DeleteTodo(i64),
}

impl Request {
    /// Validate an untyped message into a request.
    ///
    /// The error string is sent back verbatim in an error reply.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the payload was rejected.
    pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
        let Some(obj) = value.as_object() else {
            return Err("malformed request: expected a JSON object".to_string());
        };
        let Some(kind) = obj.get("type").and_then(Value::as_str) else {
            return Err("malformed request: missing type".to_string());
        };
        let data = obj.get("data");

        match kind {
            "loadTodos" => Ok(Self::LoadTodos),
            "addTodo" => parse_new_todo(data)
                .map(Self::AddTodo)
                .ok_or_else(|| INVALID_TODO_DATA.to_string()),
            "toggleTodo" => parse_id(data)
                .map(Self::ToggleTodo)
                .ok_or_else(|| INVALID_TODO_ID.to_string()),
            "deleteTodo" => parse_id(data)
                .map(Self::DeleteTodo)
                .ok_or_else(|| INVALID_TODO_ID.to_string()),
            other => Err(format!("unknown request type: {other}")),
        }
    }

    /// Wire name of the request type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LoadTodos => "loadTodos",
            Self::AddTodo(_) => "addTodo",
            Self::ToggleTodo(_) => "toggleTodo",
            Self::DeleteTodo(_) => "deleteTodo",
        }
    }

    /// Error string replied when the storage operation itself fails.
    #[must_use]
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Self::LoadTodos => "Error Loading todos",
            Self::AddTodo(_) => "Error adding todo",
            Self::ToggleTodo(_) => "Error Toggling todo",
            Self::DeleteTodo(_) => "Error deleting todo",
        }
    }
}

fn parse_new_todo(data: Option<&Value>) -> Option<NewTodo> {
    let obj = data?.as_object()?;
    let text = obj.get("text")?.as_str()?;
    if text.trim().is_empty() {
        return None;
    }
    let completed = match obj.get("completed") {
        None | Some(Value::Null) => false,
        Some(v) => v.as_bool()?,
    };
    Some(NewTodo {
        text: text.to_string(),
        completed,
    })
}

fn parse_id(data: Option<&Value>) -> Option<i64> {
    data?.as_i64()
}

/// Worker reply body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Response {
    TodosLoaded { data: Vec<Todo> },
    Error { error: String },
}

impl Response {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// The list carried by the reply, or the error it reports.
    ///
    /// # Errors
    ///
    /// Payload rejections become [`Error::InvalidRequest`]; every other
    /// error reply becomes [`Error::Worker`].
    pub fn into_result(self) -> Result<Vec<Todo>> {
        match self {
            Self::TodosLoaded { data } => Ok(data),
            Self::Error { error } if is_rejection(&error) => Err(Error::InvalidRequest(error)),
            Self::Error { error } => Err(Error::Worker(error)),
        }
    }
}

/// Whether an error reply means the payload itself was refused.
fn is_rejection(message: &str) -> bool {
    message == INVALID_TODO_DATA
        || message == INVALID_TODO_ID
        || message.starts_with("malformed request")
        || message.starts_with("unknown request type")
}

/// A request as it travels to the worker: correlation id plus the untyped
/// payload, validated on the worker side.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: u64,
    pub payload: Value,
}

/// A reply from the worker, tagged with the id of the job it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: u64,
    #[serde(flatten)]
    pub response: Response,
}

impl Reply {
    #[must_use]
    pub fn loaded(id: u64, todos: Vec<Todo>) -> Self {
        Self {
            id,
            response: Response::TodosLoaded { data: todos },
        }
    }

    #[must_use]
    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            response: Response::error(message),
        }
    }
}
