//! Persistence worker.
//!
//! The worker runs on its own OS thread and is the only code that touches
//! the store. It drains a single FIFO job queue, so requests (and in
//! particular mutations) are applied strictly one after another.
//!
//! Each job goes through the phases `Idle -> Opening -> Transaction ->
//! Complete | Failed`. The connection is opened lazily on the first job
//! that needs it and reused afterwards; if opening fails the job is
//! answered with an error and the next job tries again.
//!
//! The worker stops once every job sender has been dropped. It then drops
//! its connection and its reply sender, which ends the reply stream.

use std::fmt;
use std::path::PathBuf;
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::protocol::{DB_INIT_FAILED, Job, Reply, Request};
use crate::storage::SqliteStorage;

/// Default depth of the job queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Where the worker keeps its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A database file. The parent directory must exist.
    File(PathBuf),
    /// A private in-memory database that lives as long as the worker.
    Memory,
}

/// Settings for a worker instance.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub location: StoreLocation,
    pub busy_timeout_ms: Option<u64>,
    pub queue_capacity: usize,
}

impl WorkerConfig {
    #[must_use]
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            busy_timeout_ms: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }
}

/// Per-job progress, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Opening,
    Transaction,
    Complete,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Transaction => "transaction",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The two channel ends a caller uses to talk to a running worker.
pub struct WorkerChannels {
    pub jobs: mpsc::Sender<Job>,
    pub replies: mpsc::UnboundedReceiver<Reply>,
}

/// Owner handle for the worker thread.
#[derive(Debug)]
pub struct WorkerHandle {
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Start a worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to spawn the thread.
    pub fn spawn(config: WorkerConfig) -> Result<(Self, WorkerChannels)> {
        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        let worker = Worker::new(config);
        let thread = std::thread::Builder::new()
            .name("todo-worker".to_string())
            .spawn(move || worker.run(job_rx, &reply_tx))?;

        Ok((
            Self { thread },
            WorkerChannels {
                jobs: job_tx,
                replies: reply_rx,
            },
        ))
    }

    /// Wait for the worker thread to exit.
    ///
    /// The thread only exits after every job sender is dropped, so drop the
    /// client (and any cloned senders) first.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread panicked.
    pub fn join(self) -> Result<()> {
        self.thread
            .join()
            .map_err(|_| Error::Other("worker thread panicked".to_string()))
    }
}

/// Worker state, owned by the worker thread.
struct Worker {
    config: WorkerConfig,
    storage: Option<SqliteStorage>,
}

impl Worker {
    fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            storage: None,
        }
    }

    fn run(mut self, mut jobs: mpsc::Receiver<Job>, replies: &mpsc::UnboundedSender<Reply>) {
        info!(location = ?self.config.location, "Worker started");

        while let Some(job) = jobs.blocking_recv() {
            let id = job.id;
            let reply = self.handle(&job);
            if replies.send(reply).is_err() {
                debug!(id, "Reply receiver gone, dropping reply");
            }
        }

        self.storage = None;
        info!("Worker stopped");
    }

    /// Process one job and build its reply.
    fn handle(&mut self, job: &Job) -> Reply {
        let id = job.id;
        debug!(id, phase = %Phase::Idle, "Job received");

        // Validate before touching storage.
        let request = match Request::from_value(&job.payload) {
            Ok(request) => request,
            Err(message) => {
                warn!(id, %message, "Rejected malformed request");
                debug!(id, phase = %Phase::Failed);
                return Reply::error(id, message);
            }
        };

        debug!(id, phase = %Phase::Opening, request = request.kind());
        let storage = match self.storage() {
            Ok(storage) => storage,
            Err(e) => {
                error!(id, error = %e, "Database initialization failed");
                debug!(id, phase = %Phase::Failed);
                return Reply::error(id, DB_INIT_FAILED);
            }
        };

        debug!(id, phase = %Phase::Transaction, request = request.kind());
        match apply(storage, &request) {
            Ok(todos) => {
                debug!(id, phase = %Phase::Complete, count = todos.len());
                Reply::loaded(id, todos)
            }
            Err(e) => {
                error!(id, request = request.kind(), error = %e, "Storage operation failed");
                debug!(id, phase = %Phase::Failed);
                Reply::error(id, request.failure_message())
            }
        }
    }

    /// The lazily opened connection.
    fn storage(&mut self) -> Result<&mut SqliteStorage> {
        if self.storage.is_none() {
            let storage = match &self.config.location {
                StoreLocation::File(path) => {
                    SqliteStorage::open_with_timeout(path, self.config.busy_timeout_ms)?
                }
                StoreLocation::Memory => SqliteStorage::open_memory()?,
            };
            info!(location = ?self.config.location, "Database opened");
            self.storage = Some(storage);
        }

        self.storage
            .as_mut()
            .ok_or_else(|| Error::Other("storage not initialized".to_string()))
    }
}

/// Run one request against the store and return the full list afterwards.
fn apply(storage: &mut SqliteStorage, request: &Request) -> Result<Vec<crate::model::Todo>> {
    match request {
        Request::LoadTodos => {}
        Request::AddTodo(todo) => {
            let created = storage.add_todo(todo)?;
            debug!(todo_id = created.id, "Todo added");
        }
        Request::ToggleTodo(todo_id) => {
            if storage.toggle_todo(*todo_id)?.is_none() {
                debug!(todo_id, "Toggle of unknown id ignored");
            }
        }
        Request::DeleteTodo(todo_id) => {
            if !storage.delete_todo(*todo_id)? {
                debug!(todo_id, "Delete of unknown id ignored");
            }
        }
    }

    storage.list_todos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Response;
    use serde_json::json;

    fn job(id: u64, payload: serde_json::Value) -> Job {
        Job { id, payload }
    }

    fn todos(reply: &Reply) -> &[crate::model::Todo] {
        match &reply.response {
            Response::TodosLoaded { data } => data,
            Response::Error { error } => panic!("unexpected error reply: {error}"),
        }
    }

    #[test]
    fn test_scenario_add_toggle_delete() {
        let mut worker = Worker::new(WorkerConfig::in_memory());

        let reply = worker.handle(&job(1, json!({"type": "loadTodos"})));
        assert!(todos(&reply).is_empty());

        let reply = worker.handle(&job(
            2,
            json!({"type": "addTodo", "data": {"text": "buy milk", "completed": false}}),
        ));
        assert_eq!(reply.id, 2);
        assert_eq!(
            serde_json::to_value(todos(&reply)).unwrap(),
            json!([{"id": 1, "text": "buy milk", "completed": false}])
        );

        let reply = worker.handle(&job(3, json!({"type": "toggleTodo", "data": 1})));
        assert!(todos(&reply)[0].completed);

        let reply = worker.handle(&job(4, json!({"type": "deleteTodo", "data": 1})));
        assert!(todos(&reply).is_empty());
    }

    #[test]
    fn test_delete_unknown_id_returns_unchanged_list() {
        let mut worker = Worker::new(WorkerConfig::in_memory());
        worker.handle(&job(1, json!({"type": "addTodo", "data": {"text": "keep"}})));

        let reply = worker.handle(&job(2, json!({"type": "deleteTodo", "data": 77})));
        assert_eq!(todos(&reply).len(), 1);
        assert_eq!(todos(&reply)[0].text, "keep");
    }

    #[test]
    fn test_malformed_payload_does_not_open_storage() {
        let mut worker = Worker::new(WorkerConfig::in_memory());

        let reply = worker.handle(&job(5, json!({"type": "toggleTodo", "data": "one"})));
        assert_eq!(reply, Reply::error(5, "invalid todo ID"));
        assert!(worker.storage.is_none());

        let reply = worker.handle(&job(6, json!({"type": "addTodo", "data": 3})));
        assert_eq!(reply, Reply::error(6, "invalid todo data"));
        assert!(worker.storage.is_none());
    }

    #[test]
    fn test_open_failure_is_reported_and_retried() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("later");
        let config = WorkerConfig::new(StoreLocation::File(dir.join("todos.db")));
        let mut worker = Worker::new(config);

        let reply = worker.handle(&job(1, json!({"type": "loadTodos"})));
        assert_eq!(reply, Reply::error(1, DB_INIT_FAILED));

        std::fs::create_dir_all(&dir).unwrap();
        let reply = worker.handle(&job(2, json!({"type": "loadTodos"})));
        assert!(todos(&reply).is_empty());
    }

    #[test]
    fn test_storage_failures_use_per_request_messages() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("todos.db");
        let mut worker = Worker::new(WorkerConfig::new(StoreLocation::File(path.clone())));

        let reply = worker.handle(&job(1, json!({"type": "addTodo", "data": {"text": "a"}})));
        assert_eq!(todos(&reply).len(), 1);

        // Pull the table out from under the open connection.
        let other = rusqlite::Connection::open(&path).unwrap();
        other.execute_batch("DROP TABLE todos").unwrap();

        let cases = [
            (10, json!({"type": "loadTodos"}), "Error Loading todos"),
            (11, json!({"type": "addTodo", "data": {"text": "b"}}), "Error adding todo"),
            (12, json!({"type": "toggleTodo", "data": 1}), "Error Toggling todo"),
            (13, json!({"type": "deleteTodo", "data": 1}), "Error deleting todo"),
        ];
        for (id, payload, message) in cases {
            let request = Request::from_value(&payload).unwrap();
            assert_eq!(request.failure_message(), message);

            let reply = worker.handle(&job(id, payload));
            assert_eq!(reply, Reply::error(id, message));
        }
    }

    #[test]
    fn test_thread_processes_in_order_and_stops() {
        let (handle, channels) = WorkerHandle::spawn(WorkerConfig::in_memory()).unwrap();
        let WorkerChannels { jobs, mut replies } = channels;

        for (id, text) in [(1, "a"), (2, "b"), (3, "c")] {
            jobs.blocking_send(job(id, json!({"type": "addTodo", "data": {"text": text}})))
                .unwrap();
        }
        drop(jobs);

        let mut seen = Vec::new();
        while let Some(reply) = replies.blocking_recv() {
            seen.push((reply.id, todos(&reply).len()));
        }
        assert_eq!(seen, vec![(1, 1), (2, 2), (3, 3)]);

        handle.join().unwrap();
    }
}
