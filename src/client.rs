//! UI-side end of the worker channel.
//!
//! Every request gets a fresh correlation id and a oneshot sender registered
//! in the pending map before it is queued. A dispatcher task drains the
//! worker's replies and hands each one to the sender registered under its
//! id, so overlapping requests never see each other's replies.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::Todo;
use crate::protocol::{Job, Reply, Request, Response};
use crate::worker::{WorkerChannels, WorkerConfig, WorkerHandle};

type PendingMap = HashMap<u64, oneshot::Sender<Response>>;

/// Client for a running persistence worker.
pub struct WorkerClient {
    jobs: mpsc::Sender<Job>,
    pending: Arc<Mutex<PendingMap>>,
    next_id: AtomicU64,
}

impl WorkerClient {
    /// Attach to a worker's channels and start the reply dispatcher.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(channels: WorkerChannels) -> Self {
        let WorkerChannels { jobs, replies } = channels;
        let pending = Arc::new(Mutex::new(PendingMap::new()));

        tokio::spawn(dispatch(replies, Arc::clone(&pending)));

        Self {
            jobs,
            pending,
            next_id: AtomicU64::new(1),
        }
    }

    /// Spawn a worker and connect a client to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be started.
    pub fn spawn(config: WorkerConfig) -> Result<(WorkerHandle, Self)> {
        let (handle, channels) = WorkerHandle::spawn(config)?;
        Ok((handle, Self::new(channels)))
    }

    /// Send a typed request and wait for the list it produces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] when the worker refuses the payload,
    /// [`Error::Worker`] when it answers with any other error, and
    /// [`Error::WorkerNotReady`] when the worker is gone.
    pub async fn request(&self, request: &Request) -> Result<Vec<Todo>> {
        self.send_raw(serde_json::to_value(request)?).await
    }

    /// Send an untyped payload; the worker validates it.
    ///
    /// # Errors
    ///
    /// Same as [`WorkerClient::request`].
    pub async fn send_raw(&self, payload: Value) -> Result<Vec<Todo>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        self.pending.lock().await.insert(id, tx);

        if self.jobs.send(Job { id, payload }).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(Error::WorkerNotReady);
        }
        debug!(id, "Request queued");

        rx.await.map_err(|_| Error::WorkerNotReady)?.into_result()
    }

    #[cfg(test)]
    async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Route replies to their pending requests until the worker hangs up.
async fn dispatch(mut replies: mpsc::UnboundedReceiver<Reply>, pending: Arc<Mutex<PendingMap>>) {
    while let Some(reply) = replies.recv().await {
        let sender = pending.lock().await.remove(&reply.id);
        if let Some(sender) = sender {
            let _ = sender.send(reply.response);
        } else {
            warn!(id = reply.id, "Reply without a pending request");
        }
    }

    // Worker is gone: fail whatever is still waiting.
    pending.lock().await.clear();
    debug!("Reply dispatcher stopped");
}
