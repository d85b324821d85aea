//! Audit event storage and retrieval.
//!
//! Every mutation writes one event in the same transaction, so the history
//! never disagrees with the `todos` table.

use rusqlite::{Connection, Result};

/// Event types for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    TodoCreated,
    TodoToggled,
    TodoDeleted,
}

impl EventType {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TodoCreated => "todo_created",
            Self::TodoToggled => "todo_toggled",
            Self::TodoDeleted => "todo_deleted",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "todo_created" => Some(Self::TodoCreated),
            "todo_toggled" => Some(Self::TodoToggled),
            "todo_deleted" => Some(Self::TodoDeleted),
            _ => None,
        }
    }
}

/// An audit event record.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub todo_id: i64,
    pub event_type: EventType,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: i64,
}

impl Event {
    /// Create a new event (id will be assigned by database).
    #[must_use]
    pub fn new(todo_id: i64, event_type: EventType) -> Self {
        Self {
            id: 0,
            todo_id,
            event_type,
            old_value: None,
            new_value: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Add old/new values for field change tracking.
    #[must_use]
    pub fn with_values(mut self, old: Option<String>, new: Option<String>) -> Self {
        self.old_value = old;
        self.new_value = new;
        self
    }
}

/// Insert an event into the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    conn.execute(
        "INSERT INTO events (todo_id, event_type, old_value, new_value, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            event.todo_id,
            event.event_type.as_str(),
            event.old_value,
            event.new_value,
            event.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get the most recent events, newest first.
///
/// Rows with an unrecognised `event_type` are skipped.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn recent_events(conn: &Connection, limit: Option<u32>) -> Result<Vec<Event>> {
    let limit = limit.unwrap_or(100);
    let mut stmt = conn.prepare(
        "SELECT id, todo_id, event_type, old_value, new_value, created_at
         FROM events
         ORDER BY id DESC
         LIMIT ?1",
    )?;

    let rows = stmt.query_map([limit], |row| {
        let kind: String = row.get(2)?;
        let Some(event_type) = EventType::parse(&kind) else {
            return Ok(None);
        };
        Ok(Some(Event {
            id: row.get(0)?,
            todo_id: row.get(1)?,
            event_type,
            old_value: row.get(3)?,
            new_value: row.get(4)?,
            created_at: row.get(5)?,
        }))
    })?;

    let mut events = Vec::new();
    for row in rows {
        if let Some(event) = row? {
            events.push(event);
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::apply_schema;

    #[test]
    fn test_event_insert_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        let first = Event::new(1, EventType::TodoCreated);
        let second = Event::new(1, EventType::TodoToggled)
            .with_values(Some("false".to_string()), Some("true".to_string()));

        assert!(insert_event(&conn, &first).unwrap() > 0);
        insert_event(&conn, &second).unwrap();

        let events = recent_events(&conn, Some(10)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::TodoToggled);
        assert_eq!(events[0].new_value.as_deref(), Some("true"));
        assert_eq!(events[1].event_type, EventType::TodoCreated);
    }

    #[test]
    fn test_unknown_event_type_skipped() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO events (todo_id, event_type, created_at) VALUES (1, 'renamed', 0)",
            [],
        )
        .unwrap();

        assert!(recent_events(&conn, None).unwrap().is_empty());
    }
}
