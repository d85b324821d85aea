//! SQLite storage implementation.
//!
//! This module provides the todo store. Every write goes through
//! [`SqliteStorage::mutate`], which wraps the operation and its audit events
//! in one IMMEDIATE transaction.

use crate::error::{Error, Result};
use crate::model::{NewTodo, Todo};
use crate::storage::events::{insert_event, recent_events, Event, EventType};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

/// Default busy timeout when none is configured.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, collecting audit events.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        todo_id: i64,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.events
            .push(Event::new(todo_id, event_type).with_values(old_value, new_value));
    }
}

fn map_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        text: row.get(1)?,
        completed: row.get(2)?,
    })
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist. The
    /// parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageOpen`] if the file cannot be opened, or a
    /// database error if the schema fails to apply.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| Error::StorageOpen {
            path: path.to_path_buf(),
            source,
        })?;

        conn.busy_timeout(Duration::from_millis(
            timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        ))?;

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        tracing::trace!(op = %ctx.op_name, events = ctx.events.len(), "Mutation committed");
        Ok(result)
    }

    // ===============
    // Todo Operations
    // ===============

    /// List all todos in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_todos(&self) -> Result<Vec<Todo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, completed FROM todos ORDER BY id ASC")?;

        let rows = stmt.query_map([], map_todo)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    /// Insert a new todo and return it with its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_todo(&mut self, todo: &NewTodo) -> Result<Todo> {
        self.mutate("add_todo", |tx, ctx| {
            tx.execute(
                "INSERT INTO todos (text, completed) VALUES (?1, ?2)",
                rusqlite::params![todo.text, todo.completed],
            )?;
            let id = tx.last_insert_rowid();

            ctx.record_change(
                id,
                EventType::TodoCreated,
                None,
                Some(todo.text.clone()),
            );

            Ok(Todo {
                id,
                text: todo.text.clone(),
                completed: todo.completed,
            })
        })
    }

    /// Flip `completed` on the todo with the given id.
    ///
    /// Returns the updated todo, or `None` when no such id exists (nothing
    /// is written in that case).
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn toggle_todo(&mut self, id: i64) -> Result<Option<Todo>> {
        self.mutate("toggle_todo", |tx, ctx| {
            let current: Option<bool> = tx
                .query_row("SELECT completed FROM todos WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let Some(was_completed) = current else {
                return Ok(None);
            };

            tx.execute(
                "UPDATE todos SET completed = ?1 WHERE id = ?2",
                rusqlite::params![!was_completed, id],
            )?;

            ctx.record_change(
                id,
                EventType::TodoToggled,
                Some(was_completed.to_string()),
                Some((!was_completed).to_string()),
            );

            let todo = tx.query_row(
                "SELECT id, text, completed FROM todos WHERE id = ?1",
                [id],
                map_todo,
            )?;
            Ok(Some(todo))
        })
    }

    /// Delete the todo with the given id.
    ///
    /// Returns `true` if a row was removed. Deleting an unknown id is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_todo(&mut self, id: i64) -> Result<bool> {
        self.mutate("delete_todo", |tx, ctx| {
            let text: Option<String> = tx
                .query_row("SELECT text FROM todos WHERE id = ?1", [id], |row| {
                    row.get(0)
                })
                .optional()?;

            let rows = tx.execute("DELETE FROM todos WHERE id = ?1", [id])?;

            if rows > 0 {
                ctx.record_change(id, EventType::TodoDeleted, text, None);
            }

            Ok(rows > 0)
        })
    }

    /// Most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_events(&self, limit: Option<u32>) -> Result<Vec<Event>> {
        recent_events(&self.conn, limit).map_err(Error::from)
    }
}
