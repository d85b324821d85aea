//! List/add/toggle/delete command implementations.

use crate::cli::commands::WorkerSession;
use crate::error::Result;
use crate::model::Todo;
use crate::ui::Submission;
use crate::ui::render::render_list;
use serde::Serialize;
use std::path::PathBuf;

/// Output for every list-producing command.
#[derive(Serialize)]
struct ListOutput<'a> {
    todos: &'a [Todo],
    count: usize,
}

fn print_list(todos: &[Todo], json: bool) -> Result<()> {
    if json {
        let output = ListOutput {
            todos,
            count: todos.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !crate::is_quiet() {
        render_list(&mut std::io::stdout().lock(), Some(todos))?;
    }
    Ok(())
}

/// Show all todos.
///
/// # Errors
///
/// Returns the worker's error if the list cannot be loaded.
pub fn list(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut session = WorkerSession::start(db_path)?;
    let result = session
        .rt
        .block_on(session.ui.list())
        .map(<[Todo]>::to_vec);
    session.finish()?;

    print_list(&result?, json)
}

/// Add a todo from the given words.
///
/// # Errors
///
/// Returns the worker's error for the insert or the refetch.
pub fn add(words: &[String], db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let text = words.join(" ");

    let mut session = WorkerSession::start(db_path)?;
    let result = session.rt.block_on(session.ui.add(&text));
    let todos = session.ui.todos().map(<[Todo]>::to_vec);
    session.finish()?;

    match result? {
        Submission::Added => print_list(todos.as_deref().unwrap_or_default(), json),
        Submission::Ignored => {
            if json {
                let output = serde_json::json!({
                    "ignored": true,
                    "reason": "empty text"
                });
                println!("{output}");
            } else if !crate::is_quiet() {
                println!("Nothing to add.");
            }
            Ok(())
        }
    }
}

/// Toggle a todo.
///
/// # Errors
///
/// Returns the worker's error for the update or the refetch.
pub fn toggle(id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut session = WorkerSession::start(db_path)?;
    let result = session.rt.block_on(session.ui.toggle(id));
    let todos = session.ui.todos().map(<[Todo]>::to_vec);
    session.finish()?;

    result?;
    print_list(todos.as_deref().unwrap_or_default(), json)
}

/// Delete a todo.
///
/// # Errors
///
/// Returns the worker's error for the delete or the refetch.
pub fn delete(id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut session = WorkerSession::start(db_path)?;
    let result = session.rt.block_on(session.ui.delete(id));
    let todos = session.ui.todos().map(<[Todo]>::to_vec);
    session.finish()?;

    result?;
    print_list(todos.as_deref().unwrap_or_default(), json)
}
