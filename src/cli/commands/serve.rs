//! Serve command: the worker protocol over stdin/stdout.
//!
//! Each input line is one request object, each output line one reply. The
//! caller picks the `id`s; replies come back in request order. A line that
//! is not valid JSON is answered with an error reply carrying id 0.

use crate::config::worker_config;
use crate::error::Result;
use crate::protocol::Job;
use crate::worker::{WorkerChannels, WorkerHandle};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::runtime::Runtime;
use tracing::{info, warn};

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if the worker cannot be started or stdin/stdout fail.
pub fn execute(db_path: Option<&PathBuf>) -> Result<()> {
    let config = worker_config(db_path.map(PathBuf::as_path))?;
    let rt = Runtime::new()?;
    let (handle, channels) = WorkerHandle::spawn(config)?;

    info!("Serving worker protocol on stdin/stdout");
    let result = rt.block_on(serve(
        channels,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    ));

    handle.join()?;
    result
}

/// Pump lines from `input` into the worker and replies into `output`
/// until the input ends and every queued request has been answered.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn serve<R, W>(channels: WorkerChannels, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let WorkerChannels { jobs, mut replies } = channels;
    let mut jobs = Some(jobs);
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line(), if jobs.is_some() => {
                match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => {
                        let delivered = match &jobs {
                            Some(tx) => tx.send(parse_line(&line)).await.is_ok(),
                            None => false,
                        };
                        if !delivered {
                            warn!("Worker stopped accepting requests");
                            jobs = None;
                        }
                    }
                    // End of input: closing the queue lets the worker drain and exit.
                    None => jobs = None,
                }
            }
            reply = replies.recv() => {
                let Some(reply) = reply else { break };
                let mut buf = serde_json::to_vec(&reply)?;
                buf.push(b'\n');
                output.write_all(&buf).await?;
                output.flush().await?;
            }
        }
    }

    Ok(())
}

fn parse_line(line: &str) -> Job {
    match serde_json::from_str::<Value>(line) {
        Ok(payload) => Job {
            id: payload.get("id").and_then(Value::as_u64).unwrap_or(0),
            payload,
        },
        Err(e) => {
            warn!(error = %e, "Unparseable request line");
            Job {
                id: 0,
                payload: Value::Null,
            }
        }
    }
}
