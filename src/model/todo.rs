//! Todo model.
//!
//! A todo is created by `add`, flipped by `toggle` and destroyed by `delete`.
//! Its `id` is assigned by the store and never reused; `text` never changes
//! after creation.

use serde::{Deserialize, Serialize};

/// A persisted todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier (auto-increment, never reused)
    pub id: i64,

    /// Item text, fixed at creation
    pub text: String,

    /// Whether the item is done
    pub completed: bool,
}

impl Todo {
    /// Checkbox marker used by the terminal views.
    #[must_use]
    pub const fn checkbox(&self) -> &'static str {
        if self.completed { "[x]" } else { "[ ]" }
    }
}

/// A todo that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub text: String,

    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    /// Create a new, not yet completed todo.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }

    /// Build a todo from user input.
    ///
    /// Returns `None` when the text is empty after trimming; such
    /// submissions are ignored rather than rejected.
    #[must_use]
    pub fn from_input(input: &str) -> Option<Self> {
        if input.trim().is_empty() {
            None
        } else {
            Some(Self::new(input))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_ignores_blank() {
        assert_eq!(NewTodo::from_input(""), None);
        assert_eq!(NewTodo::from_input("   \t\n"), None);

        let todo = NewTodo::from_input("buy milk").unwrap();
        assert_eq!(todo.text, "buy milk");
        assert!(!todo.completed);
    }

    #[test]
    fn test_completed_defaults_to_false() {
        let todo: NewTodo = serde_json::from_str(r#"{"text":"walk dog"}"#).unwrap();
        assert!(!todo.completed);
    }

    #[test]
    fn test_checkbox() {
        let mut todo = Todo {
            id: 1,
            text: "x".to_string(),
            completed: false,
        };
        assert_eq!(todo.checkbox(), "[ ]");
        todo.completed = true;
        assert_eq!(todo.checkbox(), "[x]");
    }
}
