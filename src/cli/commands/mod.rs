//! Command implementations.

pub mod completions;
pub mod history;
pub mod serve;
pub mod shell;
pub mod todo;
pub mod version;

use crate::client::WorkerClient;
use crate::config::worker_config;
use crate::error::Result;
use crate::ui::TodoController;
use crate::worker::WorkerHandle;
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// A runtime, a running worker and a controller attached to it.
///
/// Commands start one, drive the controller with `rt.block_on`, and call
/// [`WorkerSession::finish`] to stop the worker cleanly.
pub(crate) struct WorkerSession {
    pub rt: Runtime,
    pub ui: TodoController,
    handle: WorkerHandle,
}

impl WorkerSession {
    pub fn start(db_path: Option<&PathBuf>) -> Result<Self> {
        let config = worker_config(db_path.map(PathBuf::as_path))?;
        let rt = Runtime::new()?;

        let (handle, client) = {
            let _guard = rt.enter();
            WorkerClient::spawn(config)?
        };

        Ok(Self {
            rt,
            ui: TodoController::new(client),
            handle,
        })
    }

    /// Drop the controller, then wait for the worker to drain and exit.
    pub fn finish(self) -> Result<()> {
        let Self { rt, ui, handle } = self;
        drop(ui);
        let joined = handle.join();
        drop(rt);
        joined
    }
}
