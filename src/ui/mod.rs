//! UI controller.
//!
//! Holds the view model (a read-only copy of the list) and drives the
//! worker through a [`WorkerClient`]. Every successful mutation is followed
//! by a full `loadTodos` refetch and the view is replaced with its result,
//! so the view never needs merge logic.
//!
//! - [`render`] - terminal rendering of the view model
//! - [`shell`] - interactive line shell

pub mod render;
pub mod shell;

use tracing::error;

use crate::client::WorkerClient;
use crate::error::Result;
use crate::model::{NewTodo, Todo};
use crate::protocol::Request;

/// Result of an `add` submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The todo was stored and the view refreshed.
    Added,
    /// Blank input; nothing was sent.
    Ignored,
}

/// Drives the worker and keeps the view model in sync with the store.
pub struct TodoController {
    client: WorkerClient,
    todos: Option<Vec<Todo>>,
}

impl TodoController {
    #[must_use]
    pub fn new(client: WorkerClient) -> Self {
        Self {
            client,
            todos: None,
        }
    }

    /// Current view, or `None` before the first successful load.
    #[must_use]
    pub fn todos(&self) -> Option<&[Todo]> {
        self.todos.as_deref()
    }

    /// Reload the full list from the worker.
    ///
    /// # Errors
    ///
    /// Returns the worker's error; the view keeps its previous contents.
    pub async fn list(&mut self) -> Result<&[Todo]> {
        match self.client.request(&Request::LoadTodos).await {
            Ok(todos) => {
                let todos = self.todos.insert(todos);
                Ok(todos.as_slice())
            }
            Err(e) => {
                error!(error = %e, "worker error");
                Err(e)
            }
        }
    }

    /// Add a todo. Blank text is ignored without contacting the worker.
    ///
    /// # Errors
    ///
    /// Returns the worker's error for the insert or the refetch.
    pub async fn add(&mut self, text: &str) -> Result<Submission> {
        let Some(todo) = NewTodo::from_input(text) else {
            return Ok(Submission::Ignored);
        };
        self.mutate(Request::AddTodo(todo)).await?;
        Ok(Submission::Added)
    }

    /// Flip `completed` on a todo. Unknown ids leave the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns the worker's error for the update or the refetch.
    pub async fn toggle(&mut self, id: i64) -> Result<()> {
        self.mutate(Request::ToggleTodo(id)).await
    }

    /// Delete a todo. Unknown ids leave the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns the worker's error for the delete or the refetch.
    pub async fn delete(&mut self, id: i64) -> Result<()> {
        self.mutate(Request::DeleteTodo(id)).await
    }

    // `&mut self` keeps a second mutation from starting while one is in flight.
    async fn mutate(&mut self, request: Request) -> Result<()> {
        if let Err(e) = self.client.request(&request).await {
            error!(request = request.kind(), error = %e, "worker error");
            return Err(e);
        }

        self.list().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::worker::WorkerConfig;

    async fn controller() -> TodoController {
        let (_handle, client) = WorkerClient::spawn(WorkerConfig::in_memory()).unwrap();
        TodoController::new(client)
    }

    #[tokio::test]
    async fn test_view_empty_until_loaded() {
        let mut ui = controller().await;
        assert!(ui.todos().is_none());

        ui.list().await.unwrap();
        assert_eq!(ui.todos(), Some(&[][..]));
    }

    #[tokio::test]
    async fn test_add_refreshes_view() {
        let mut ui = controller().await;

        assert_eq!(ui.add("buy milk").await.unwrap(), Submission::Added);
        let todos = ui.todos().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].text, "buy milk");
        assert!(!todos[0].completed);
    }

    #[tokio::test]
    async fn test_blank_add_is_ignored() {
        let mut ui = controller().await;
        ui.add("keep").await.unwrap();

        assert_eq!(ui.add("   ").await.unwrap(), Submission::Ignored);
        assert_eq!(ui.todos().unwrap().len(), 1);
        assert_eq!(ui.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scenario() {
        let mut ui = controller().await;
        assert!(ui.list().await.unwrap().is_empty());

        ui.add("buy milk").await.unwrap();
        assert_eq!(
            ui.todos().unwrap(),
            &[Todo {
                id: 1,
                text: "buy milk".to_string(),
                completed: false
            }]
        );

        ui.toggle(1).await.unwrap();
        assert!(ui.todos().unwrap()[0].completed);

        ui.delete(1).await.unwrap();
        assert!(ui.todos().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_leaves_others_alone() {
        let mut ui = controller().await;
        ui.add("a").await.unwrap();
        ui.add("b").await.unwrap();
        ui.add("c").await.unwrap();

        ui.toggle(2).await.unwrap();
        let flags: Vec<bool> = ui.todos().unwrap().iter().map(|t| t.completed).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let mut ui = controller().await;
        ui.add("a").await.unwrap();
        let before = ui.todos().unwrap().to_vec();

        ui.toggle(99).await.unwrap();
        ui.delete(99).await.unwrap();
        assert_eq!(ui.todos().unwrap(), before.as_slice());
    }

    #[tokio::test]
    async fn test_worker_error_keeps_view() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = WorkerConfig::new(crate::worker::StoreLocation::File(
            temp.path().join("nope").join("todos.db"),
        ));
        let (_handle, client) = WorkerClient::spawn(config).unwrap();
        let mut ui = TodoController::new(client);

        let err = ui.add("x").await.unwrap_err();
        assert!(matches!(err, Error::Worker(ref m) if m == "Database initialization failed"));
        assert!(ui.todos().is_none());
    }
}
