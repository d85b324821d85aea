//! Terminal rendering of the todo view.

use std::io::{self, Write};

use colored::Colorize;

use crate::model::Todo;

/// Write the view model to `out`.
///
/// `None` means the list has not been loaded yet.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_list(out: &mut impl Write, todos: Option<&[Todo]>) -> io::Result<()> {
    let Some(todos) = todos else {
        return writeln!(out, "Loading todos...");
    };

    if todos.is_empty() {
        return writeln!(out, "No todos yet.");
    }

    for todo in todos {
        writeln!(out, "{}", render_item(todo))?;
    }

    let done = todos.iter().filter(|t| t.completed).count();
    writeln!(out)?;
    writeln!(out, "{done}/{} done", todos.len())
}

/// One line per todo: checkbox, id, text.
#[must_use]
pub fn render_item(todo: &Todo) -> String {
    let text = if todo.completed {
        todo.text.strikethrough().dimmed().to_string()
    } else {
        todo.text.clone()
    };
    format!("{} {}  {}", todo.checkbox(), format!("{:>3}", todo.id).cyan(), text)
}
