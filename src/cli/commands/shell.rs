//! Interactive shell command.

use crate::cli::commands::WorkerSession;
use crate::error::Result;
use crate::ui::shell::run_shell;
use std::path::PathBuf;
use tokio::io::BufReader;

/// Run the interactive shell on stdin/stdout.
///
/// # Errors
///
/// Returns an error if the worker cannot be started or the terminal
/// cannot be read or written.
pub fn execute(db_path: Option<&PathBuf>) -> Result<()> {
    let mut session = WorkerSession::start(db_path)?;

    let ui = &mut session.ui;
    let result = session.rt.block_on(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        run_shell(ui, stdin, &mut std::io::stdout()).await
    });

    session.finish()?;
    result
}
