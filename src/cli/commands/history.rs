//! History command: recent audit events.
//!
//! Reads the store directly on a short-lived connection; no worker is
//! started.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::{Event, SqliteStorage};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct EventOutput<'a> {
    id: i64,
    todo_id: i64,
    event_type: &'static str,
    old_value: Option<&'a str>,
    new_value: Option<&'a str>,
    created_at: i64,
}

impl<'a> From<&'a Event> for EventOutput<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            id: event.id,
            todo_id: event.todo_id,
            event_type: event.event_type.as_str(),
            old_value: event.old_value.as_deref(),
            new_value: event.new_value.as_deref(),
            created_at: event.created_at,
        }
    }
}

#[derive(Serialize)]
struct HistoryOutput<'a> {
    events: Vec<EventOutput<'a>>,
    count: usize,
}

/// Execute the history command.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read.
pub fn execute(db_path: Option<&PathBuf>, limit: u32, json: bool) -> Result<()> {
    let path = resolve_db_path(db_path.map(PathBuf::as_path))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;

    // Nothing has ever been written; don't create a store just to read it.
    let events = if path.exists() {
        SqliteStorage::open(&path)?.list_events(Some(limit))?
    } else {
        Vec::new()
    };

    if json {
        let output = HistoryOutput {
            events: events.iter().map(EventOutput::from).collect(),
            count: events.len(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if crate::is_quiet() {
        return Ok(());
    }

    if events.is_empty() {
        println!("No history.");
        return Ok(());
    }

    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

fn format_event(event: &Event) -> String {
    let when = chrono::DateTime::from_timestamp_millis(event.created_at)
        .map_or_else(|| event.created_at.to_string(), |t| {
            t.format("%Y-%m-%d %H:%M:%S").to_string()
        });

    let change = match (&event.old_value, &event.new_value) {
        (Some(old), Some(new)) => format!(" {old} -> {new}"),
        (None, Some(new)) => format!(" {new}"),
        (Some(old), None) => format!(" {old}"),
        (None, None) => String::new(),
    };

    format!(
        "{when}  #{:<4} {}{change}",
        event.todo_id,
        event.event_type.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EventType;

    #[test]
    fn test_format_event() {
        let event = Event {
            id: 1,
            todo_id: 3,
            event_type: EventType::TodoToggled,
            old_value: Some("false".to_string()),
            new_value: Some("true".to_string()),
            created_at: 0,
        };
        assert_eq!(
            format_event(&event),
            "1970-01-01 00:00:00  #3    todo_toggled false -> true"
        );
    }

    #[test]
    fn test_event_output_json() {
        let event = Event::new(7, EventType::TodoDeleted).with_values(Some("milk".into()), None);
        let value = serde_json::to_value(EventOutput::from(&event)).unwrap();
        assert_eq!(value["todo_id"], 7);
        assert_eq!(value["event_type"], "todo_deleted");
        assert_eq!(value["old_value"], "milk");
        assert!(value["new_value"].is_null());
    }
}
